//! Closed-form descriptive statistics for two-arm proportion experiments.
//!
//! These complement the sequential test: the z-score and standard errors are
//! what a fixed-sample comparison of the same two arms would be built from.

use serde::{Deserialize, Serialize};

/// Standard normal quantile (probit), Abramowitz and Stegun 26.2.23.
///
/// Absolute error is below 4.5e-4 across (0, 1).
pub fn normal_quantile(p: f64) -> f64 {
    if p.is_nan() {
        return f64::NAN;
    }
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    if (p - 0.5).abs() < 1e-15 {
        return 0.0;
    }

    let (sign, tail) = if p < 0.5 { (-1.0, p) } else { (1.0, 1.0 - p) };
    let t = (-2.0 * tail.ln()).sqrt();

    const C0: f64 = 2.515_517;
    const C1: f64 = 0.802_853;
    const C2: f64 = 0.010_328;
    const D1: f64 = 1.432_788;
    const D2: f64 = 0.189_269;
    const D3: f64 = 0.001_308;

    let num = C0 + t * (C1 + t * C2);
    let den = 1.0 + t * (D1 + t * (D2 + t * D3));
    sign * (t - num / den)
}

/// z-score at the given lower-tail probability.
///
/// `z_score(0.05)` is about -1.645; pass `1 - alpha` for the upper tail.
pub fn z_score(alpha: f64) -> f64 {
    normal_quantile(alpha)
}

/// Standard error of a proportion `p` estimated from `total` trials.
///
/// Returns NaN for `p` outside [0, 1] or a non-positive total.
pub fn std_error(p: f64, total: f64) -> f64 {
    if !(0.0..=1.0).contains(&p) || total.is_nan() || total <= 0.0 {
        return f64::NAN;
    }
    (p * (1.0 - p) / total).sqrt()
}

/// Pooled standard deviation of the difference between two proportions.
///
/// `sqrt(p(1-p) * (1/control_total + 1/exposed_total))`.
pub fn pooled_std(p_pooled: f64, control_total: f64, exposed_total: f64) -> f64 {
    if !(0.0..=1.0).contains(&p_pooled) {
        return f64::NAN;
    }
    if control_total.is_nan() || exposed_total.is_nan() {
        return f64::NAN;
    }
    if control_total <= 0.0 || exposed_total <= 0.0 {
        return f64::NAN;
    }
    (p_pooled * (1.0 - p_pooled) * (1.0 / control_total + 1.0 / exposed_total)).sqrt()
}

/// Descriptive summary of a two-arm proportion experiment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProportionSummary {
    /// z-score at the requested alpha.
    pub z_score: f64,
    /// Standard error of the pooled proportion over all trials.
    pub std_error: f64,
    /// Pooled standard deviation of the difference.
    pub pooled_std: f64,
}

impl ProportionSummary {
    /// Compute all helpers for one pooled proportion and two arm totals.
    pub fn compute(alpha: f64, p_pooled: f64, control_total: f64, exposed_total: f64) -> Self {
        Self {
            z_score: z_score(alpha),
            std_error: std_error(p_pooled, control_total + exposed_total),
            pooled_std: pooled_std(p_pooled, control_total, exposed_total),
        }
    }
}
