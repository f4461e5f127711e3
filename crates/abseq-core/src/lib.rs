//! abseq core: trial-sequence reconstruction and the conditional SPRT.
//!
//! # Modules
//!
//! - `sequence`: aggregate buckets to per-trial binary sequences
//! - `sprt`: Meeker's conditional sequential test and its decision types
//! - `aggregate`: impression CSV and bucket-file loading
//! - `diagnostics`: the injected sink for warnings and decision events
//! - `logging`: subscriber setup for the binary
//! - `exit_codes`: stable CLI exit codes

pub mod aggregate;
pub mod diagnostics;
pub mod exit_codes;
pub mod logging;
pub mod sequence;
pub mod sprt;

pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, TracingSink};
pub use sequence::{build_trial_sequence, SequenceBuilder, SequenceError, TrialSequence};
pub use sprt::{conditional_sprt, Outcome, SprtEngine, SprtError, SprtResult};
