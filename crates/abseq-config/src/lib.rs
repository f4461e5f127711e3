//! abseq test-parameter loading and validation.
//!
//! This crate provides:
//! - The typed `params.json` structure
//! - Path resolution (CLI → env → XDG → defaults)
//! - Semantic validation split into fatal errors and warnings
//! - Snapshots recording which parameters a run used

pub mod loader;
pub mod params;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use loader::{load_params, ConfigError, LoadOptions, ResolvedParams};
pub use params::{ParamOverrides, TestParams};
pub use resolve::{resolve_params_path, ConfigSource};
pub use snapshot::ParamsSnapshot;
pub use validate::{validate_params, ValidationError, ValidationResult, ValidationWarning};

/// Schema version for parameter files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
