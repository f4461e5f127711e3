//! Exit codes for the `abseq` CLI.
//!
//! Exit code ranges:
//! - 0-2: Test outcomes (read the outcome from the code, not the output)
//! - 10-19: User/environment errors (fixable by the caller)
//! - 20-29: Internal errors

use abseq_common::{Error, ErrorCategory};

use crate::sprt::Outcome;

/// Exit codes for abseq commands. Stable contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    // ========================================================================
    // Outcomes (0-2)
    // ========================================================================
    /// Boundary crossed, or a non-test command succeeded
    Conclusive = 0,

    /// Data exhausted without a decision
    Inconclusive = 1,

    /// Decision forced by the truncation point
    Truncated = 2,

    // ========================================================================
    // User / Environment Errors (10-19)
    // ========================================================================
    /// Invalid arguments
    ArgsError = 10,

    /// Parameter file missing, malformed or invalid
    ConfigError = 11,

    /// Input data violates the test's contract
    InputError = 12,

    // ========================================================================
    // Internal Errors (20-29)
    // ========================================================================
    /// Internal error (bug - please report)
    InternalError = 20,

    /// I/O error
    IoError = 21,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Outcome codes (0-2) are not errors.
    pub fn is_operational(self) -> bool {
        (self as i32) < 10
    }

    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }

    /// Code name for JSON output.
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Conclusive => "OK_CONCLUSIVE",
            ExitCode::Inconclusive => "OK_INCONCLUSIVE",
            ExitCode::Truncated => "OK_TRUNCATED",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::InputError => "ERR_INPUT",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }

    /// Exit code for a finished run.
    pub fn from_outcome(outcome: Outcome) -> Self {
        match outcome {
            Outcome::RejectNull | Outcome::AcceptNull => ExitCode::Conclusive,
            Outcome::Inconclusive => ExitCode::Inconclusive,
            Outcome::TruncatedH0 | Outcome::TruncatedH1 => ExitCode::Truncated,
        }
    }

    /// Exit code for a failed command.
    pub fn from_error(err: &Error) -> Self {
        match err.category() {
            ErrorCategory::Config => ExitCode::ConfigError,
            ErrorCategory::Input | ErrorCategory::Numerical => ExitCode::InputError,
            ErrorCategory::Io => ExitCode::IoError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        // All codes fit in a u8.
        std::process::ExitCode::from(code as u8)
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abseq_common::Arm;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Conclusive.as_i32(), 0);
        assert_eq!(ExitCode::Inconclusive.as_i32(), 1);
        assert_eq!(ExitCode::Truncated.as_i32(), 2);
        assert_eq!(ExitCode::ArgsError.as_i32(), 10);
        assert_eq!(ExitCode::InputError.as_i32(), 12);
        assert_eq!(ExitCode::IoError.as_i32(), 21);
    }

    #[test]
    fn test_ranges() {
        assert!(ExitCode::Truncated.is_operational());
        assert!(ExitCode::ConfigError.is_user_error());
        assert!(!ExitCode::InternalError.is_user_error());
        assert!(ExitCode::InternalError.is_error());
    }

    #[test]
    fn test_outcome_mapping() {
        assert_eq!(ExitCode::from_outcome(Outcome::AcceptNull), ExitCode::Conclusive);
        assert_eq!(ExitCode::from_outcome(Outcome::Inconclusive), ExitCode::Inconclusive);
        assert_eq!(ExitCode::from_outcome(Outcome::TruncatedH1), ExitCode::Truncated);
    }

    #[test]
    fn test_error_mapping() {
        let err = Error::EmptySequence { arm: Arm::Control };
        assert_eq!(ExitCode::from_error(&err), ExitCode::InputError);
        let err = Error::Config("bad".into());
        assert_eq!(ExitCode::from_error(&err), ExitCode::ConfigError);
        let err = Error::Io(std::io::Error::other("gone"));
        assert_eq!(ExitCode::from_error(&err), ExitCode::IoError);
    }

    #[test]
    fn test_display() {
        assert_eq!(ExitCode::Truncated.to_string(), "OK_TRUNCATED (2)");
    }
}
