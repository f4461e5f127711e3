//! Conditional sequential probability ratio test for two binomial arms.
//!
//! Meeker's (1981) test conditions on the total number of successes `r`
//! after `n` paired trials, which removes the unknown baseline rate and
//! leaves a single parameter: the odds ratio of treatment against control.
//! H0 is odds ratio 1, H1 is odds ratio `t1`.
//!
//! The engine evaluates the full statistic and critical-interval traces up
//! to the evaluation length, then scans for the first boundary crossing.

pub mod decision;
pub mod likelihood;

pub use decision::{CriticalInterval, Outcome, SprtResult, TruncationDecision, WaldBoundaries};

use abseq_common::Arm;
use abseq_config::{validate_params, TestParams, ValidationError, ValidationWarning};
use thiserror::Error;

use self::likelihood::ConditionalLikelihood;

use crate::diagnostics::{Diagnostic, DiagnosticSink};

/// Errors that refuse a run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SprtError {
    #[error("{arm} sequence is empty")]
    EmptySequence { arm: Arm },

    #[error("{arm} observation {index} is {value}, expected 0 or 1")]
    NonBinaryObservation { arm: Arm, index: usize, value: u8 },

    #[error("odds ratio {odds_ratio} leaves the critical bounds undefined")]
    DegenerateOddsRatio { odds_ratio: f64 },

    #[error("truncation point {truncation_point} outside 1..={available}")]
    TruncationOutOfRange {
        truncation_point: usize,
        available: usize,
    },

    #[error(transparent)]
    InvalidParams(#[from] ValidationError),
}

impl From<SprtError> for abseq_common::Error {
    fn from(err: SprtError) -> Self {
        match err {
            SprtError::EmptySequence { arm } => abseq_common::Error::EmptySequence { arm },
            SprtError::NonBinaryObservation { arm, index, value } => {
                abseq_common::Error::NonBinaryObservation { arm, index, value }
            }
            SprtError::DegenerateOddsRatio { odds_ratio } => {
                abseq_common::Error::DegenerateOddsRatio { odds_ratio }
            }
            SprtError::TruncationOutOfRange {
                truncation_point,
                available,
            } => abseq_common::Error::TruncationOutOfRange {
                truncation_point,
                available,
            },
            SprtError::InvalidParams(inner) => inner.into(),
        }
    }
}

/// The sequential test, configured once and run against any pair of arms.
pub struct SprtEngine<'a> {
    params: TestParams,
    sink: Option<&'a dyn DiagnosticSink>,
}

impl<'a> SprtEngine<'a> {
    pub fn new(params: TestParams) -> Self {
        Self { params, sink: None }
    }

    pub fn with_sink(mut self, sink: &'a dyn DiagnosticSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn params(&self) -> &TestParams {
        &self.params
    }

    /// Run the test on treatment `x` and control `y`.
    ///
    /// Unequal lengths are tolerated with a warning: only the common prefix
    /// is evaluated.
    pub fn run(&self, x: &[u8], y: &[u8]) -> Result<SprtResult, SprtError> {
        let mut warnings = self.check_params()?;
        check_binary(Arm::Treatment, x)?;
        check_binary(Arm::Control, y)?;

        if x.len() != y.len() {
            warnings.push(ValidationWarning::UnequalArmLengths {
                treatment: x.len(),
                control: y.len(),
            });
        }
        let available = x.len().min(y.len());
        let len = match self.params.truncation_point {
            Some(tp) if tp == 0 || tp > available => {
                return Err(SprtError::TruncationOutOfRange {
                    truncation_point: tp,
                    available,
                })
            }
            Some(tp) => tp,
            None => available,
        };

        for warning in &warnings {
            self.emit(Diagnostic::Warning {
                warning: warning.clone(),
            });
        }

        let t1 = self.params.odds_ratio;
        let boundaries = WaldBoundaries::from_error_rates(self.params.alpha, self.params.beta);
        let likelihood = ConditionalLikelihood::new(len as u64, t1);

        let mut traces = Traces::with_capacity(len);
        let (mut x1, mut r) = (0u64, 0u64);
        for (i, (&xi, &yi)) in x.iter().zip(y).take(len).enumerate() {
            let n = (i + 1) as u64;
            x1 += u64::from(xi);
            r += u64::from(xi) + u64::from(yi);

            let step = likelihood.step(x1, r, n);
            let raw = likelihood.critical_interval(&step, boundaries.l, boundaries.u);
            traces.x1.push(x1);
            traces.r.push(r);
            traces.stats.push(step.statistic);
            traces.critical.push(CriticalInterval {
                lower: raw.lower.floor(),
                upper: raw.upper.floor(),
            });
        }

        Ok(self.conclude(traces, &likelihood, boundaries, warnings))
    }

    /// Scan finished traces for the first crossing, falling back to the
    /// truncation rule when there is none.
    fn conclude(
        &self,
        traces: Traces,
        likelihood: &ConditionalLikelihood,
        boundaries: WaldBoundaries,
        warnings: Vec<ValidationWarning>,
    ) -> SprtResult {
        for (i, s) in traces.stats.iter().enumerate() {
            if s.is_nan() {
                self.emit(Diagnostic::UndefinedStatistic {
                    n: i + 1,
                    x1: traces.x1[i],
                    r: traces.r[i],
                });
            }
        }

        let crossing = traces
            .stats
            .iter()
            .enumerate()
            .find_map(|(i, &s)| boundaries.classify(s).map(|outcome| (i + 1, outcome)));

        let (outcome, stopping_index, truncation) = match (crossing, self.params.truncation_point)
        {
            (Some((n, outcome)), _) => {
                self.emit(Diagnostic::BoundaryCrossed {
                    n,
                    statistic: traces.stats[n - 1],
                    outcome,
                });
                (outcome, Some(n), None)
            }
            (None, Some(tp)) => {
                let x1 = traces.x1.last().copied().unwrap_or(0);
                let r = traces.r.last().copied().unwrap_or(0);
                let decision = truncate(likelihood, tp, x1, r, &boundaries);
                let outcome = if (decision.x1 as f64) >= decision.threshold {
                    Outcome::TruncatedH1
                } else {
                    Outcome::TruncatedH0
                };
                self.emit(Diagnostic::Truncated {
                    n: tp,
                    x1: decision.x1,
                    threshold: decision.threshold,
                    outcome,
                });
                (outcome, Some(tp), Some(decision))
            }
            (None, None) => (Outcome::Inconclusive, None, None),
        };

        SprtResult {
            outcome,
            observations: traces.stats.len(),
            stopping_index,
            boundaries,
            odds_ratio: self.params.odds_ratio,
            alpha: self.params.alpha,
            beta: self.params.beta,
            truncation_point: self.params.truncation_point,
            truncation,
            x1: traces.x1,
            r: traces.r,
            stats: traces.stats,
            critical: traces.critical,
            warnings,
        }
    }

    fn check_params(&self) -> Result<Vec<ValidationWarning>, SprtError> {
        let warnings = validate_params(&self.params)?;
        if self.params.odds_ratio == 1.0 {
            return Err(SprtError::DegenerateOddsRatio {
                odds_ratio: self.params.odds_ratio,
            });
        }
        Ok(warnings)
    }

    fn emit(&self, diagnostic: Diagnostic) {
        if let Some(sink) = self.sink {
            sink.record(&diagnostic);
        }
    }
}

/// Per-step traces, one entry per evaluated pair.
struct Traces {
    x1: Vec<u64>,
    r: Vec<u64>,
    stats: Vec<f64>,
    critical: Vec<CriticalInterval>,
}

impl Traces {
    fn with_capacity(len: usize) -> Self {
        Self {
            x1: Vec::with_capacity(len),
            r: Vec::with_capacity(len),
            stats: Vec::with_capacity(len),
            critical: Vec::with_capacity(len),
        }
    }
}

/// Run the test once without diagnostics.
pub fn conditional_sprt(
    x: &[u8],
    y: &[u8],
    params: &TestParams,
) -> Result<SprtResult, SprtError> {
    SprtEngine::new(params.clone()).run(x, y)
}

fn check_binary(arm: Arm, values: &[u8]) -> Result<(), SprtError> {
    if values.is_empty() {
        return Err(SprtError::EmptySequence { arm });
    }
    match values.iter().position(|&v| v > 1) {
        Some(index) => Err(SprtError::NonBinaryObservation {
            arm,
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}

/// Resolve a run that reached its truncation point without crossing.
///
/// A NaN threshold (undefined normalizers) compares false, so the run
/// falls back to H0.
fn truncate(
    likelihood: &ConditionalLikelihood,
    at: usize,
    x1: u64,
    r: u64,
    boundaries: &WaldBoundaries,
) -> TruncationDecision {
    let step = likelihood.step(x1, r, at as u64);
    let raw = likelihood.critical_interval(&step, boundaries.l, boundaries.u);
    TruncationDecision {
        at,
        x1,
        raw_lower: raw.lower,
        raw_upper: raw.upper,
        threshold: (raw.midpoint() - 0.5).floor(),
    }
}
