//! Conditional likelihood of the treatment success count.
//!
//! Given `n` paired trials and `r` total successes, the treatment count `x`
//! follows a noncentral hypergeometric law with odds ratio `t`:
//!
//! ```text
//! P(x | r, n, t) = C(n, x) C(n, r - x) t^x / f(r, n, t)
//! f(r, n, t)     = sum_{j = max(0, r - n)}^{min(n, r)} C(n, j) C(n, r - j) t^j
//! ```
//!
//! Everything is evaluated on the log scale. The statistic only needs the
//! ratio of the two normalizers, and both share the summands
//! `C(n, j) C(n, r - j)`, so one pass over `j` feeds both log-sum-exp
//! accumulators. The `t1` summand is the null summand plus `j ln t1`.

use abseq_math::{LogFactorialTable, LogSumExp};

/// Likelihood evaluator for one odds ratio, sized for a run of `max_n`
/// paired trials.
#[derive(Debug, Clone)]
pub struct ConditionalLikelihood {
    factorials: LogFactorialTable,
    ln_t1: f64,
}

/// The statistic and normalizer ratio at one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// `ln P(x | t1) - ln P(x | 1)`, NaN when undefined.
    pub statistic: f64,
    /// `z = ln f(r, n, t1) - ln f(r, n, 1)`, NaN when undefined.
    pub normalizer_ratio: f64,
}

impl ConditionalLikelihood {
    pub fn new(max_n: u64, t1: f64) -> Self {
        Self {
            factorials: LogFactorialTable::new(max_n),
            ln_t1: t1.ln(),
        }
    }

    /// `logC(n, j) + logC(n, r - j)`.
    fn log_base(&self, j: u64, r: u64, n: u64) -> f64 {
        let (j, r, n) = (j as i64, r as i64, n as i64);
        self.factorials.log_choose(n, j) + self.factorials.log_choose(n, r - j)
    }

    /// Evaluate the statistic for `x` treatment successes out of `r` after
    /// `n` pairs.
    ///
    /// The statistic is `x ln t1 - z`, which is what makes the critical
    /// bounds invertible in closed form.
    pub fn step(&self, x: u64, r: u64, n: u64) -> Step {
        let mut null = LogSumExp::new();
        let mut alt = LogSumExp::new();
        for j in r.saturating_sub(n)..=n.min(r) {
            let base = self.log_base(j, r, n);
            null.push(base);
            alt.push(base + j as f64 * self.ln_t1);
        }
        let (null, alt) = (null.value(), alt.value());
        if !null.is_finite() || !alt.is_finite() {
            return Step {
                statistic: f64::NAN,
                normalizer_ratio: f64::NAN,
            };
        }
        let z = alt - null;
        Step {
            statistic: x as f64 * self.ln_t1 - z,
            normalizer_ratio: z,
        }
    }

    /// Invert a step against the Wald boundaries `l` and `u`.
    pub fn critical_interval(&self, step: &Step, l: f64, u: f64) -> RawInterval {
        RawInterval {
            lower: (l + step.normalizer_ratio) / self.ln_t1,
            upper: (u + step.normalizer_ratio) / self.ln_t1,
        }
    }
}

/// Log-likelihood ratio of the alternative odds ratio `t1` against the null
/// odds ratio 1 at the observed counts.
pub fn log_likelihood_ratio(x: u64, r: u64, n: u64, t1: f64) -> f64 {
    ConditionalLikelihood::new(n, t1).step(x, r, n).statistic
}

/// `z = ln f(r, n, t1) - ln f(r, n, 1)`.
pub fn log_normalizer_ratio(r: u64, n: u64, t1: f64) -> f64 {
    ConditionalLikelihood::new(n, t1).step(0, r, n).normalizer_ratio
}

/// Critical values of `x1` before rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawInterval {
    /// `(l + z) / ln t1`: the statistic is at or below `l` up to here.
    pub lower: f64,
    /// `(u + z) / ln t1`: the statistic reaches `u` from here.
    pub upper: f64,
}

impl RawInterval {
    pub fn midpoint(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }
}

/// Invert the statistic at `(r, n)` against the Wald boundaries `l` and `u`.
pub fn raw_critical_interval(r: u64, n: u64, t1: f64, l: f64, u: f64) -> RawInterval {
    let likelihood = ConditionalLikelihood::new(n, t1);
    likelihood.critical_interval(&likelihood.step(0, r, n), l, u)
}
