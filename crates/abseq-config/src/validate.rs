//! Parameter validation: fatal errors and non-fatal warnings.
//!
//! A parameter set either violates the test's contract (an error, the run is
//! refused) or is merely unusual (a warning, the run proceeds and the answer
//! is reported alongside the warning).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::params::TestParams;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Parameter validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl From<ValidationError> for abseq_common::Error {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidValue { field, message } => {
                abseq_common::Error::InvalidParameter { field, message }
            }
            other => abseq_common::Error::Config(other.to_string()),
        }
    }
}

/// Conditions that make a run less reliable without invalidating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// The alternative odds ratio is at or below the null value of 1.
    OddsRatioNotAboveOne { odds_ratio: f64 },
    /// alpha or beta above 0.5.
    UnrealisticErrorRates { alpha: f64, beta: f64 },
    /// The arms differ in length; only the common prefix is tested.
    UnequalArmLengths { treatment: usize, control: usize },
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationWarning::OddsRatioNotAboveOne { odds_ratio } => {
                write!(f, "odds ratio should exceed 1 (got {})", odds_ratio)
            }
            ValidationWarning::UnrealisticErrorRates { alpha, beta } => write!(
                f,
                "unrealistic error rates (alpha={}, beta={}); values above 0.5 need a good reason",
                alpha, beta
            ),
            ValidationWarning::UnequalArmLengths { treatment, control } => write!(
                f,
                "arm lengths differ (treatment={}, control={}); testing the first {}",
                treatment,
                control,
                treatment.min(control)
            ),
        }
    }
}

/// Validate a parameter set.
///
/// Returns the warnings on success. The truncation point is only checked
/// for positivity here; its upper limit depends on the data.
pub fn validate_params(params: &TestParams) -> ValidationResult<Vec<ValidationWarning>> {
    if params.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: params.schema_version.clone(),
        });
    }
    validate_error_rate("alpha", params.alpha)?;
    validate_error_rate("beta", params.beta)?;

    let t1 = params.odds_ratio;
    if !t1.is_finite() || t1 <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: "odds_ratio".to_string(),
            message: format!("Must be positive and finite, got {}", t1),
        });
    }

    if params.truncation_point == Some(0) {
        return Err(ValidationError::InvalidValue {
            field: "truncation_point".to_string(),
            message: "Must be at least 1".to_string(),
        });
    }

    let mut warnings = Vec::new();
    if t1 <= 1.0 {
        warnings.push(ValidationWarning::OddsRatioNotAboveOne { odds_ratio: t1 });
    }
    if params.alpha > 0.5 || params.beta > 0.5 {
        warnings.push(ValidationWarning::UnrealisticErrorRates {
            alpha: params.alpha,
            beta: params.beta,
        });
    }
    Ok(warnings)
}

fn validate_error_rate(field: &str, value: f64) -> ValidationResult<()> {
    if value.is_nan() || value <= 0.0 || value >= 1.0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("Must be in (0, 1), got {}", value),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_clean() {
        let warnings = validate_params(&TestParams::default()).unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn odds_ratio_below_one_warns() {
        let warnings = validate_params(&TestParams::new(0.8, 0.05, 0.1)).unwrap();
        assert_eq!(
            warnings,
            vec![ValidationWarning::OddsRatioNotAboveOne { odds_ratio: 0.8 }]
        );
    }

    #[test]
    fn large_error_rates_warn() {
        let warnings = validate_params(&TestParams::new(2.0, 0.6, 0.1)).unwrap();
        assert!(matches!(
            warnings[0],
            ValidationWarning::UnrealisticErrorRates { .. }
        ));
        assert!(warnings[0].to_string().contains("unrealistic error rates"));
    }

    #[test]
    fn error_rates_outside_unit_interval_fail() {
        for (alpha, beta) in [(0.0, 0.1), (1.0, 0.1), (0.05, -0.2), (f64::NAN, 0.1)] {
            let err = validate_params(&TestParams::new(2.0, alpha, beta)).unwrap_err();
            assert!(matches!(err, ValidationError::InvalidValue { .. }));
        }
    }

    #[test]
    fn non_positive_odds_ratio_fails() {
        assert!(validate_params(&TestParams::new(0.0, 0.05, 0.1)).is_err());
        assert!(validate_params(&TestParams::new(f64::INFINITY, 0.05, 0.1)).is_err());
    }

    #[test]
    fn zero_truncation_fails() {
        let params = TestParams::default().with_truncation(0);
        let err = validate_params(&params).unwrap_err();
        assert!(err.to_string().contains("truncation_point"));
    }

    #[test]
    fn schema_mismatch_fails() {
        let params = TestParams {
            schema_version: "0.1.0".to_string(),
            ..TestParams::default()
        };
        assert!(matches!(
            validate_params(&params),
            Err(ValidationError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn converts_into_common_error() {
        let err: abseq_common::Error = ValidationError::InvalidValue {
            field: "alpha".into(),
            message: "bad".into(),
        }
        .into();
        assert_eq!(err.code(), 11);

        let err: abseq_common::Error = ValidationError::VersionMismatch {
            expected: "1.0.0".into(),
            actual: "0.1.0".into(),
        }
        .into();
        assert_eq!(err.code(), 10);
    }
}
