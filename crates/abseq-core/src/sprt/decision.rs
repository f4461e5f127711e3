//! Decision types: Wald boundaries, outcomes and the run result.

use abseq_config::ValidationWarning;
use serde::{Deserialize, Serialize};

/// Wald's stopping boundaries for the log-likelihood ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaldBoundaries {
    /// Acceptance boundary `ln(beta / (1 - alpha))`.
    pub l: f64,
    /// Rejection boundary `-ln(alpha / (1 - beta))`.
    pub u: f64,
}

impl WaldBoundaries {
    /// Boundaries from the Type I / Type II error bounds.
    pub fn from_error_rates(alpha: f64, beta: f64) -> Self {
        Self {
            l: (beta / (1.0 - alpha)).ln(),
            u: -(alpha / (1.0 - beta)).ln(),
        }
    }

    /// Outcome implied by a single statistic value, if any.
    ///
    /// NaN never crosses.
    pub fn classify(&self, statistic: f64) -> Option<Outcome> {
        if statistic >= self.u {
            Some(Outcome::RejectNull)
        } else if statistic <= self.l {
            Some(Outcome::AcceptNull)
        } else {
            None
        }
    }
}

/// Final state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Neither boundary was crossed before the data ran out.
    Inconclusive,
    /// The treatment arm's odds are significantly higher.
    RejectNull,
    /// No meaningful difference at the requested odds ratio.
    AcceptNull,
    /// Truncation forced a decision for the null.
    #[serde(rename = "truncated_h0")]
    TruncatedH0,
    /// Truncation forced a decision for the alternative.
    #[serde(rename = "truncated_h1")]
    TruncatedH1,
}

impl Outcome {
    /// A boundary was crossed.
    pub fn is_conclusive(self) -> bool {
        matches!(self, Outcome::RejectNull | Outcome::AcceptNull)
    }

    pub fn is_truncated(self) -> bool {
        matches!(self, Outcome::TruncatedH0 | Outcome::TruncatedH1)
    }

    /// Whether the run (fully or by truncation) favours the alternative.
    pub fn favours_treatment(self) -> bool {
        matches!(self, Outcome::RejectNull | Outcome::TruncatedH1)
    }

    /// One-line reading of the outcome for operators.
    pub fn summary(self) -> &'static str {
        match self {
            Outcome::Inconclusive => "No decision yet: the test needs more observations.",
            Outcome::RejectNull => {
                "The exposed group produced a statistically significant increase."
            }
            Outcome::AcceptNull => "The groups show no statistically significant difference.",
            Outcome::TruncatedH0 => {
                "Truncated: the observed successes lean towards no difference."
            }
            Outcome::TruncatedH1 => {
                "Truncated: the observed successes lean towards an increase for the exposed group."
            }
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Outcome::Inconclusive => "inconclusive",
            Outcome::RejectNull => "reject_null",
            Outcome::AcceptNull => "accept_null",
            Outcome::TruncatedH0 => "truncated_h0",
            Outcome::TruncatedH1 => "truncated_h1",
        };
        write!(f, "{}", s)
    }
}

/// Integer critical values of `x1` at one step.
///
/// NaN where the normalizers were undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CriticalInterval {
    /// Largest `x1` at which the statistic is at or below `l`.
    pub lower: f64,
    /// Smallest `x1` at which the statistic reaches `u`.
    pub upper: f64,
}

/// How a truncated run was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TruncationDecision {
    /// The truncation point (number of paired observations).
    pub at: usize,
    /// Treatment successes observed at the truncation point.
    pub x1: u64,
    /// Unrounded critical interval at the truncation point.
    pub raw_lower: f64,
    pub raw_upper: f64,
    /// `floor(midpoint - 0.5)`; `x1` at or above it favours the alternative.
    pub threshold: f64,
}

/// Everything one run produced. Traces are indexed by `n - 1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SprtResult {
    pub outcome: Outcome,
    /// Paired observations evaluated.
    pub observations: usize,
    /// 1-based step of the first boundary crossing, or the truncation point.
    pub stopping_index: Option<usize>,
    pub boundaries: WaldBoundaries,
    pub odds_ratio: f64,
    pub alpha: f64,
    pub beta: f64,
    pub truncation_point: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncation: Option<TruncationDecision>,
    pub x1: Vec<u64>,
    pub r: Vec<u64>,
    /// Log-likelihood ratio per step; NaN (null in JSON) where undefined.
    pub stats: Vec<f64>,
    pub critical: Vec<CriticalInterval>,
    pub warnings: Vec<ValidationWarning>,
}

impl SprtResult {
    /// Statistic at the stopping index, if the run stopped.
    pub fn stopping_statistic(&self) -> Option<f64> {
        self.stopping_index
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| self.stats.get(i))
            .copied()
    }

    /// Drop the per-step traces, keeping the decision.
    pub fn without_traces(mut self) -> Self {
        self.x1.clear();
        self.r.clear();
        self.stats.clear();
        self.critical.clear();
        self
    }
}
