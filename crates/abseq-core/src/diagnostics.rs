//! Diagnostic sink injected into the builder and the engine.
//!
//! The library never installs a subscriber. Callers hand in a sink; the
//! binary uses [`TracingSink`], tests use [`CollectingSink`].

use std::sync::Mutex;

use abseq_common::Arm;
use abseq_config::ValidationWarning;
use serde::Serialize;

use crate::logging::{event_names, Stage};
use crate::sprt::Outcome;

/// Something worth telling the operator about while a run progresses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A non-fatal parameter or input finding.
    Warning { warning: ValidationWarning },
    /// One arm's trial sequence was reconstructed from its buckets.
    SequenceBuilt {
        arm: Option<Arm>,
        buckets: usize,
        trials: usize,
        successes: u64,
    },
    /// The statistic could not be evaluated at step `n`.
    UndefinedStatistic { n: usize, x1: u64, r: u64 },
    /// The statistic crossed a Wald boundary.
    BoundaryCrossed {
        n: usize,
        statistic: f64,
        outcome: Outcome,
    },
    /// The truncation point forced a decision.
    Truncated {
        n: usize,
        x1: u64,
        threshold: f64,
        outcome: Outcome,
    },
}

impl Diagnostic {
    /// Stable event name for structured logs.
    pub fn event_name(&self) -> &'static str {
        match self {
            Diagnostic::Warning { .. } => event_names::PARAMS_WARNING,
            Diagnostic::SequenceBuilt { .. } => event_names::SEQUENCE_BUILT,
            Diagnostic::UndefinedStatistic { .. } => event_names::SPRT_UNDEFINED_STATISTIC,
            Diagnostic::BoundaryCrossed { .. } => event_names::SPRT_BOUNDARY_CROSSED,
            Diagnostic::Truncated { .. } => event_names::SPRT_TRUNCATED,
        }
    }

    /// Pipeline stage the diagnostic belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            Diagnostic::Warning { .. } => Stage::Validate,
            Diagnostic::SequenceBuilt { .. } => Stage::Sequence,
            Diagnostic::UndefinedStatistic { .. } => Stage::Test,
            Diagnostic::BoundaryCrossed { .. } | Diagnostic::Truncated { .. } => Stage::Decide,
        }
    }
}

/// Receiver for run diagnostics.
pub trait DiagnosticSink {
    fn record(&self, diagnostic: &Diagnostic);
}

/// Forwards diagnostics to `tracing`, tagged with the invocation's run id.
#[derive(Debug, Clone)]
pub struct TracingSink {
    run_id: String,
}

impl TracingSink {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }
}

impl DiagnosticSink for TracingSink {
    fn record(&self, diagnostic: &Diagnostic) {
        let event = diagnostic.event_name();
        let stage = diagnostic.stage();
        match diagnostic {
            Diagnostic::Warning { warning } => tracing::warn!(
                event,
                run_id = %self.run_id,
                stage = %stage,
                "{}",
                warning
            ),
            Diagnostic::SequenceBuilt {
                arm,
                buckets,
                trials,
                successes,
            } => tracing::debug!(
                event,
                run_id = %self.run_id,
                stage = %stage,
                arm = ?arm,
                buckets,
                trials,
                successes,
                "trial sequence built"
            ),
            Diagnostic::UndefinedStatistic { n, x1, r } => tracing::debug!(
                event,
                run_id = %self.run_id,
                stage = %stage,
                n,
                x1,
                r,
                "statistic undefined"
            ),
            Diagnostic::BoundaryCrossed {
                n,
                statistic,
                outcome,
            } => tracing::info!(
                event,
                run_id = %self.run_id,
                stage = %stage,
                n,
                statistic,
                outcome = %outcome,
                "boundary crossed"
            ),
            Diagnostic::Truncated {
                n,
                x1,
                threshold,
                outcome,
            } => tracing::info!(
                event,
                run_id = %self.run_id,
                stage = %stage,
                n,
                x1,
                threshold,
                outcome = %outcome,
                "truncated decision"
            ),
        }
    }
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    records: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn records(&self) -> Vec<Diagnostic> {
        match self.records.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Only the warnings, in emission order.
    pub fn warnings(&self) -> Vec<ValidationWarning> {
        self.records()
            .into_iter()
            .filter_map(|d| match d {
                Diagnostic::Warning { warning } => Some(warning),
                _ => None,
            })
            .collect()
    }
}

impl DiagnosticSink for CollectingSink {
    fn record(&self, diagnostic: &Diagnostic) {
        match self.records.lock() {
            Ok(mut guard) => guard.push(diagnostic.clone()),
            Err(poisoned) => poisoned.into_inner().push(diagnostic.clone()),
        }
    }
}
