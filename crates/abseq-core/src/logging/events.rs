//! Structured event vocabulary for logging.
//!
//! Every event carries a run id and a stage so JSONL output can be grouped
//! per invocation and per pipeline step.

use serde::{Deserialize, Serialize};

/// Steps of one `abseq` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and parameter resolution.
    Init,
    /// Reading buckets or impression records.
    Load,
    /// Parameter and input checks.
    Validate,
    /// Reconstructing trial sequences from buckets.
    Sequence,
    /// Evaluating the statistic trace.
    Test,
    /// Boundary scan and truncation.
    Decide,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Load => "load",
            Stage::Validate => "validate",
            Stage::Sequence => "sequence",
            Stage::Test => "test",
            Stage::Decide => "decide",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    // Config/init
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const PARAMS_WARNING: &str = "params.warning";

    // Load stage
    pub const INPUT_LOADED: &str = "input.loaded";

    // Sequence stage
    pub const SEQUENCE_BUILT: &str = "sequence.built";

    // Test / decide stages
    pub const SPRT_STARTED: &str = "sprt.started";
    pub const SPRT_UNDEFINED_STATISTIC: &str = "sprt.undefined_statistic";
    pub const SPRT_BOUNDARY_CROSSED: &str = "sprt.boundary_crossed";
    pub const SPRT_TRUNCATED: &str = "sprt.truncated";

    pub const INTERNAL_ERROR: &str = "internal_error";
}
