//! Parameter loading with resolution, overrides and validation.

use std::path::PathBuf;

use thiserror::Error;

use crate::params::{ParamOverrides, TestParams};
use crate::resolve::{resolve_params_path, ConfigSource};
use crate::snapshot::ParamsSnapshot;
use crate::validate::{validate_params, ValidationError, ValidationWarning};

/// Errors that can occur during parameter loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Parameter file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid JSON in parameter file {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Semantic validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl From<ConfigError> for abseq_common::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ValidationError(inner) => inner.into(),
            ConfigError::IoError { source, .. } => abseq_common::Error::Io(source),
            other => abseq_common::Error::Config(other.to_string()),
        }
    }
}

/// Loading options.
#[derive(Debug, Default)]
pub struct LoadOptions {
    /// Explicit parameter file path (highest priority).
    pub params_path: Option<PathBuf>,
    /// Field overrides applied after loading.
    pub overrides: ParamOverrides,
}

/// Effective parameters with provenance.
#[derive(Debug, Clone)]
pub struct ResolvedParams {
    pub params: TestParams,
    pub source: ConfigSource,
    pub path: Option<PathBuf>,
    /// Non-fatal findings from validation.
    pub warnings: Vec<ValidationWarning>,
    pub snapshot: ParamsSnapshot,
}

/// Resolve, load, override and validate test parameters.
pub fn load_params(options: &LoadOptions) -> Result<ResolvedParams, ConfigError> {
    let (path, source) = resolve_params_path(options.params_path.as_deref());

    let (mut params, raw) = match &path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::NotFound { path: path.clone() });
            }
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
                path: path.clone(),
                source,
            })?;
            let params: TestParams =
                serde_json::from_str(&raw).map_err(|source| ConfigError::ParseError {
                    path: path.clone(),
                    source,
                })?;
            (params, Some(raw))
        }
        None => (TestParams::default(), None),
    };

    params.apply(&options.overrides);
    let warnings = validate_params(&params)?;
    let snapshot = ParamsSnapshot::new(&params, source, path.clone(), raw.as_deref());

    Ok(ResolvedParams {
        params,
        source,
        path,
        warnings,
        snapshot,
    })
}
