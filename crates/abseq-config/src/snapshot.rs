//! Parameter snapshots for reproducibility.
//!
//! A snapshot records which parameters a run used and where they came from,
//! so a decision can be audited and replayed later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

use crate::params::TestParams;
use crate::resolve::ConfigSource;

/// A frozen snapshot of the effective parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamsSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Where the parameter file came from.
    pub source: ConfigSource,

    /// Path the parameter file was loaded from.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// SHA-256 of the raw file content (None for built-in defaults).
    #[serde(default)]
    pub file_hash: Option<String>,

    /// SHA-256 of the effective parameters after overrides.
    pub effective_hash: String,

    /// The effective parameters.
    pub params: TestParams,
}

impl ParamsSnapshot {
    pub fn new(
        params: &TestParams,
        source: ConfigSource,
        path: Option<PathBuf>,
        raw_content: Option<&str>,
    ) -> Self {
        // Serializing a plain struct of numbers and strings cannot fail.
        let effective = serde_json::to_string(params).unwrap_or_default();
        Self {
            timestamp: Utc::now(),
            source,
            path,
            file_hash: raw_content.map(hash_content),
            effective_hash: hash_content(&effective),
            params: params.clone(),
        }
    }
}

/// SHA-256 hex digest of a string.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_sha256() {
        assert_eq!(
            hash_content(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn effective_hash_tracks_overrides() {
        let a = ParamsSnapshot::new(&TestParams::default(), ConfigSource::BuiltinDefault, None, None);
        let b = ParamsSnapshot::new(
            &TestParams::default().with_truncation(10),
            ConfigSource::BuiltinDefault,
            None,
            None,
        );
        assert_ne!(a.effective_hash, b.effective_hash);
        assert!(a.file_hash.is_none());
    }
}
