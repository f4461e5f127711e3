//! Numerically stable log-domain primitives for combinatorial likelihoods.
//!
//! Binomial coefficients for realistic experiment sizes overflow `f64` long
//! before the likelihood ratios built on top of them become interesting, so
//! everything here works on the log scale and never materializes factorials.

use std::f64::consts::PI;

const LOG_SQRT_2PI: f64 = 0.918_938_533_204_672_8; // 0.5 * ln(2*pi)
const LANCZOS_G: f64 = 7.0;
#[allow(clippy::excessive_precision)] // These are published numerical constants
const LANCZOS_COEFFS: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

/// Stable log(sum(exp(values))).
///
/// Returns NEG_INFINITY for empty input or all -inf inputs, NaN if any input
/// is NaN.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NEG_INFINITY;
    }
    if values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max.is_infinite() {
        return max;
    }
    let sum: f64 = values.iter().map(|v| (v - max).exp()).sum();
    max + sum.ln()
}

/// Natural log of the Gamma function (log |Gamma(z)|).
///
/// Lanczos approximation, with the reflection formula below 0.5. Poles at the
/// non-positive integers return NaN.
pub fn log_gamma(z: f64) -> f64 {
    if z.is_nan() || z == f64::NEG_INFINITY {
        return f64::NAN;
    }
    if z == f64::INFINITY {
        return f64::INFINITY;
    }
    if z <= 0.0 && (z - z.round()).abs() < 1e-15 {
        return f64::NAN;
    }
    if z < 0.5 {
        let sin_pi = (PI * z).sin();
        if sin_pi == 0.0 {
            return f64::NAN;
        }
        return PI.ln() - sin_pi.abs().ln() - log_gamma(1.0 - z);
    }

    let z_minus = z - 1.0;
    let mut x = LANCZOS_COEFFS[0];
    for (i, coeff) in LANCZOS_COEFFS.iter().enumerate().skip(1) {
        x += coeff / (z_minus + i as f64);
    }
    let t = z_minus + LANCZOS_G + 0.5;
    LOG_SQRT_2PI + (z_minus + 0.5) * t.ln() - t + x.ln()
}

/// log(n!) using the Gamma function.
pub fn log_factorial(n: u64) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    log_gamma((n as f64) + 1.0)
}

/// log binomial coefficient: log(n choose k), NEG_INFINITY when k > n.
pub fn log_binomial(n: u64, k: u64) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    if k == 0 || k == n {
        return 0.0;
    }
    log_factorial(n) - log_factorial(k) - log_factorial(n - k)
}

/// log(n choose k) over signed arguments, contributing no log-mass outside
/// `0 <= k <= n`.
///
/// Unlike [`log_binomial`] this never returns -inf: an out-of-range `k`
/// yields 0.0 so sums over split indices stay well-defined at the edges of
/// the feasible range.
pub fn log_choose(n: i64, k: i64) -> f64 {
    if n < 0 || k < 0 || k > n {
        return 0.0;
    }
    log_binomial(n as u64, k as u64)
}

/// Running log-sum-exp over a stream of log values.
///
/// Rescales the partial sum whenever a new maximum arrives, so no buffer
/// of terms is needed. Agrees with [`log_sum_exp`] on the same inputs.
#[derive(Debug, Clone, Copy)]
pub struct LogSumExp {
    max: f64,
    sum: f64,
    nan: bool,
}

impl Default for LogSumExp {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSumExp {
    pub fn new() -> Self {
        Self {
            max: f64::NEG_INFINITY,
            sum: 0.0,
            nan: false,
        }
    }

    pub fn push(&mut self, value: f64) {
        if value.is_nan() {
            self.nan = true;
            return;
        }
        if value == f64::NEG_INFINITY {
            return;
        }
        if value > self.max {
            self.sum = if self.max == f64::NEG_INFINITY {
                1.0
            } else {
                self.sum * (self.max - value).exp() + 1.0
            };
            self.max = value;
        } else {
            self.sum += (value - self.max).exp();
        }
    }

    pub fn value(&self) -> f64 {
        if self.nan {
            return f64::NAN;
        }
        if self.max.is_infinite() {
            return self.max;
        }
        self.max + self.sum.ln()
    }
}

/// `ln k!` for every `k` up to a fixed bound.
///
/// Built once per run so each binomial coefficient is three lookups.
#[derive(Debug, Clone)]
pub struct LogFactorialTable {
    values: Vec<f64>,
}

impl LogFactorialTable {
    pub fn new(max: u64) -> Self {
        Self {
            values: (0..=max).map(log_factorial).collect(),
        }
    }

    /// Largest `k` covered by the table.
    pub fn max(&self) -> u64 {
        self.values.len() as u64 - 1
    }

    /// `ln k!`, falling back to the Gamma function past the table bound.
    pub fn log_factorial(&self, k: u64) -> f64 {
        match self.values.get(k as usize) {
            Some(&v) => v,
            None => log_factorial(k),
        }
    }

    /// Same contract as [`log_choose`].
    pub fn log_choose(&self, n: i64, k: i64) -> f64 {
        if n < 0 || k < 0 || k > n {
            return 0.0;
        }
        if k == 0 || k == n {
            return 0.0;
        }
        let (n, k) = (n as u64, k as u64);
        self.log_factorial(n) - self.log_factorial(k) - self.log_factorial(n - k)
    }
}
