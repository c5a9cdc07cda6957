//! Error types for testbandit.
//!
//! Every error carries:
//! - A stable numeric code for machine parsing
//! - A category for grouping
//! - A recoverability hint
//!
//! # Agent-Facing Output
//!
//! Errors serialize to structured JSON through [`ErrorReport`]:
//! ```json
//! {
//!   "code": 10,
//!   "category": "usage",
//!   "message": "invalid argument: successes (3) exceed trials (2)",
//!   "recoverable": false
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for testbandit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The caller passed bad input or invoked the engine out of order.
    Usage,
    /// Posterior sampling failed for numerical reasons.
    Inference,
    /// Configuration file errors.
    Config,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Usage => write!(f, "usage"),
            ErrorCategory::Inference => write!(f, "inference"),
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for testbandit.
#[derive(Error, Debug)]
pub enum Error {
    // Usage errors (10-29)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("precondition failed: {0}")]
    Precondition(String),

    // Inference errors (30-39)
    #[error("posterior sampling failed: {0}")]
    Sampling(String),

    // Configuration errors (40-49)
    #[error("configuration error: {0}")]
    Config(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Codes are stable and grouped by category:
    /// - 10-29: Usage errors
    /// - 30-39: Inference errors
    /// - 40-49: Configuration errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidArgument(_) => 10,
            Error::Precondition(_) => 20,
            Error::Sampling(_) => 30,
            Error::Config(_) => 40,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidArgument(_) | Error::Precondition(_) => ErrorCategory::Usage,
            Error::Sampling(_) => ErrorCategory::Inference,
            Error::Config(_) => ErrorCategory::Config,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether retrying (possibly after fixing the environment) can help.
    ///
    /// Usage errors never are: the same call fails the same way.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::InvalidArgument(_) | Error::Precondition(_) => false,
            Error::Sampling(_) => false,
            Error::Config(_) => true,
            Error::Io(_) => true,
            Error::Json(_) => true,
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::InvalidArgument(_) => "Invalid Argument",
            Error::Precondition(_) => "Precondition Failed",
            Error::Sampling(_) => "Sampling Error",
            Error::Config(_) => "Configuration Error",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Error",
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::InvalidArgument(_) => {
                "Check the values passed in; successes may not exceed trials and priors must be positive."
            }
            Error::Precondition(_) => {
                "Register at least two variations and record trials for each before comparing them."
            }
            Error::Sampling(_) => "Posterior shape parameters are degenerate; check the priors.",
            Error::Config(_) => {
                "Run 'testbandit check --config <path>' to validate the experiment file."
            }
            Error::Io(_) => "Check that the file exists and is readable.",
            Error::Json(_) => "Invalid JSON; check syntax with 'jq . <file>'.",
        }
    }

    /// Format for terminal output: headline, reason, fix.
    pub fn format_human(&self) -> String {
        format!(
            "✗ {}\n  Reason: {}\n  Fix: {}",
            self.headline(),
            self,
            self.remediation()
        )
    }

    /// Structured snapshot for machine output.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code(),
            category: self.category(),
            message: self.to_string(),
            recoverable: self.is_recoverable(),
        }
    }
}

/// Serializable error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: u32,
    pub category: ErrorCategory,
    pub message: String,
    pub recoverable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_grouped_by_category() {
        let cases = [
            (Error::InvalidArgument("x".into()), 10, ErrorCategory::Usage),
            (Error::Precondition("x".into()), 20, ErrorCategory::Usage),
            (Error::Sampling("x".into()), 30, ErrorCategory::Inference),
            (Error::Config("x".into()), 40, ErrorCategory::Config),
        ];
        for (err, code, category) in cases {
            assert_eq!(err.code(), code);
            assert_eq!(err.category(), category);
        }
    }

    #[test]
    fn usage_errors_are_not_recoverable() {
        assert!(!Error::InvalidArgument("x".into()).is_recoverable());
        assert!(!Error::Precondition("x".into()).is_recoverable());
        assert!(Error::Config("x".into()).is_recoverable());
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert_eq!(err.code(), 60);
        assert_eq!(err.category(), ErrorCategory::Io);
    }

    #[test]
    fn report_serializes() {
        let err = Error::InvalidArgument("successes (3) exceed trials (2)".into());
        let json = serde_json::to_value(err.report()).unwrap();
        assert_eq!(json["code"], 10);
        assert_eq!(json["category"], "usage");
        assert_eq!(json["recoverable"], false);
        assert_eq!(
            json["message"],
            "invalid argument: successes (3) exceed trials (2)"
        );
    }

    #[test]
    fn human_format_has_headline_and_fix() {
        let text = Error::Precondition("no trials".into()).format_human();
        assert!(text.contains("Precondition Failed"));
        assert!(text.contains("Reason: precondition failed: no trials"));
        assert!(text.contains("Fix:"));
    }
}
