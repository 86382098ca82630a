//! Unified error types for Lexis.
//!
//! Every engine operation fails with a [`LexisError`]. Callers branch on
//! [`LexisError::kind`] to tell invalid input apart from a missing item, a
//! lost optimistic-concurrency race, an interrupted request, or an
//! infrastructure failure. The engine never retries; recovery belongs to the
//! caller.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Lexis operations.
#[derive(Error, Debug)]
pub enum LexisError {
    /// Grade outside the accepted `[1, 5]` range.
    #[error("grade must be between 1 and 5, got {grade}")]
    InvalidGrade { grade: i64 },

    /// Malformed input (ids, status names, duplicate inserts, config values).
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// The referenced learnable item does not exist.
    #[error("learnable item not found: {id}")]
    NotFound { id: String },

    /// The item changed between load and persist.
    #[error("learnable item {id} was modified concurrently (expected version {expected}, found {actual})")]
    Conflict {
        id: String,
        expected: u64,
        actual: u64,
    },

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// The caller's deadline passed before the operation finished.
    #[error("operation deadline exceeded")]
    DeadlineExceeded,

    /// I/O errors from the file store.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON or TOML serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },
}

/// A specialized Result type for Lexis operations.
pub type Result<T> = std::result::Result<T, LexisError>;

/// Coarse classification of a [`LexisError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller sent something invalid; resubmitting corrected input works.
    InvalidInput,
    /// The referenced resource does not exist.
    NotFound,
    /// Another writer won the race for the same item.
    Conflict,
    /// Cancelled or timed out by the caller.
    Interrupted,
    /// Storage, serialization or configuration failure.
    Infrastructure,
}

impl LexisError {
    /// Create an invalid grade error.
    pub fn invalid_grade(grade: i64) -> Self {
        Self::InvalidGrade { grade }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a not found error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create a version conflict error.
    pub fn conflict(id: impl Into<String>, expected: u64, actual: u64) -> Self {
        Self::Conflict {
            id: id.into(),
            expected,
            actual,
        }
    }

    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidGrade { .. } | Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Cancelled | Self::DeadlineExceeded => ErrorKind::Interrupted,
            Self::Storage { .. } | Self::Serde { .. } | Self::Config { .. } => {
                ErrorKind::Infrastructure
            }
        }
    }

    /// Whether the caller can fix this error by changing its input.
    pub fn is_caller_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidInput | ErrorKind::NotFound)
    }
}

impl From<io::Error> for LexisError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for LexisError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Exit codes for the Lexis CLI.
pub mod exit_codes {
    use super::ErrorKind;

    /// Command completed.
    pub const SUCCESS: i32 = 0;

    /// Infrastructure failure (storage, serialization, config).
    pub const ERROR: i32 = 1;

    /// Invalid input (bad grade, malformed id, unknown status).
    pub const INVALID_INPUT: i32 = 2;

    /// Referenced item does not exist.
    pub const NOT_FOUND: i32 = 3;

    /// Concurrent modification or interrupted request; safe to re-run.
    pub const RETRY: i32 = 4;

    /// Map an error kind to its exit code.
    pub fn for_kind(kind: ErrorKind) -> i32 {
        match kind {
            ErrorKind::InvalidInput => INVALID_INPUT,
            ErrorKind::NotFound => NOT_FOUND,
            ErrorKind::Conflict | ErrorKind::Interrupted => RETRY,
            ErrorKind::Infrastructure => ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_grade_display() {
        let err = LexisError::invalid_grade(7);
        assert_eq!(err.to_string(), "grade must be between 1 and 5, got 7");
    }

    #[test]
    fn test_not_found_display() {
        let err = LexisError::not_found("m-42");
        assert_eq!(err.to_string(), "learnable item not found: m-42");
    }

    #[test]
    fn test_conflict_display() {
        let err = LexisError::conflict("m-1", 3, 4);
        assert!(err.to_string().contains("expected version 3"));
        assert!(err.to_string().contains("found 4"));
    }

    #[test]
    fn test_storage_error_display() {
        let err = LexisError::storage(
            "/tmp/items/a.json",
            io::Error::new(io::ErrorKind::NotFound, "file not found"),
        );
        assert!(err.to_string().contains("storage error"));
        assert!(err.to_string().contains("/tmp/items/a.json"));
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(LexisError::invalid_grade(0).kind(), ErrorKind::InvalidInput);
        assert_eq!(LexisError::invalid_input("x").kind(), ErrorKind::InvalidInput);
        assert_eq!(LexisError::not_found("x").kind(), ErrorKind::NotFound);
        assert_eq!(LexisError::conflict("x", 1, 2).kind(), ErrorKind::Conflict);
        assert_eq!(LexisError::Cancelled.kind(), ErrorKind::Interrupted);
        assert_eq!(LexisError::DeadlineExceeded.kind(), ErrorKind::Interrupted);
        assert_eq!(LexisError::serde("x").kind(), ErrorKind::Infrastructure);
        assert_eq!(LexisError::config("x").kind(), ErrorKind::Infrastructure);
    }

    #[test]
    fn test_is_caller_error() {
        assert!(LexisError::invalid_grade(9).is_caller_error());
        assert!(LexisError::not_found("x").is_caller_error());
        assert!(!LexisError::conflict("x", 1, 2).is_caller_error());
        assert!(!LexisError::serde("x").is_caller_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: LexisError = io_err.into();
        assert!(matches!(err, LexisError::Storage { .. }));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: LexisError = json_err.into();
        assert!(matches!(err, LexisError::Serde { .. }));
    }

    #[test]
    fn test_exit_codes_for_kind() {
        assert_eq!(exit_codes::for_kind(ErrorKind::InvalidInput), 2);
        assert_eq!(exit_codes::for_kind(ErrorKind::NotFound), 3);
        assert_eq!(exit_codes::for_kind(ErrorKind::Conflict), 4);
        assert_eq!(exit_codes::for_kind(ErrorKind::Interrupted), 4);
        assert_eq!(exit_codes::for_kind(ErrorKind::Infrastructure), 1);
    }
}
