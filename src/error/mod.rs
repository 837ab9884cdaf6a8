//! Error types and handling for `beads_ready`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Supports `anyhow` integration through a transparent variant
//! - Separates "store not found" from "store unreachable" from "store corrupt"
//! - Data-quality anomalies (dangling or self edges) are NOT errors; they are
//!   reported as [`crate::graph::GraphWarning`]s
//! - Provides structured JSON output for AI coding agents

mod structured;

pub use structured::{ErrorCode, StructuredError};

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `beads_ready` operations.
#[derive(Error, Debug)]
pub enum ReadyError {
    // === Repository Errors ===
    /// No issue store could be located for the workspace.
    #[error("Issue store not found at '{path}'")]
    RepositoryNotFound { path: PathBuf },

    /// The store exists but could not be read right now.
    #[error("Issue store unavailable: {reason}")]
    RepositoryUnavailable { reason: String },

    /// The store was read but its contents cannot be interpreted.
    #[error("Issue store corrupt: {reason}")]
    RepositoryCorrupt { reason: String },

    /// A record violates the minimal schema (e.g. duplicate identifier).
    #[error("Schema violation: {reason}")]
    SchemaViolation { reason: String },

    /// The facade gave up waiting for a snapshot.
    #[error("Query deadline exceeded after {waited_ms}ms")]
    DeadlineExceeded { waited_ms: u64 },

    // === Configuration Errors ===
    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for ReadyError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode as SqliteCode;

        match &err {
            rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
                SqliteCode::DatabaseCorrupt | SqliteCode::NotADatabase => {
                    Self::RepositoryCorrupt {
                        reason: err.to_string(),
                    }
                }
                _ => Self::RepositoryUnavailable {
                    reason: err.to_string(),
                },
            },
            rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::InvalidColumnType(..)
            | rusqlite::Error::IntegralValueOutOfRange(..)
            | rusqlite::Error::Utf8Error(..) => Self::RepositoryCorrupt {
                reason: err.to_string(),
            },
            _ => Self::RepositoryUnavailable {
                reason: err.to_string(),
            },
        }
    }
}

impl ReadyError {
    /// Create a corrupt-repository error.
    #[must_use]
    pub fn corrupt(reason: impl Into<String>) -> Self {
        Self::RepositoryCorrupt {
            reason: reason.into(),
        }
    }

    /// Create an unavailable-repository error.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::RepositoryUnavailable {
            reason: reason.into(),
        }
    }

    /// Might the same call succeed if the caller simply tries again?
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RepositoryUnavailable { .. } | Self::DeadlineExceeded { .. }
        )
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::RepositoryNotFound { .. } => {
                Some("Run from inside a beads workspace, or pass --db / --jsonl")
            }
            Self::RepositoryUnavailable { .. } => {
                Some("Retry, or raise --lock-timeout if another process holds the database")
            }
            Self::RepositoryCorrupt { .. } | Self::SchemaViolation { .. } => {
                Some("Inspect the store; partial results are never returned")
            }
            Self::DeadlineExceeded { .. } => Some("Retry, or raise the deadline-ms setting"),
            _ => None,
        }
    }
}

/// Result type using `ReadyError`.
pub type Result<T> = std::result::Result<T, ReadyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReadyError::RepositoryNotFound {
            path: PathBuf::from("/tmp/ws/.beads"),
        };
        assert_eq!(err.to_string(), "Issue store not found at '/tmp/ws/.beads'");

        let err = ReadyError::corrupt("issue row 3 has no id");
        assert_eq!(err.to_string(), "Issue store corrupt: issue row 3 has no id");
    }

    #[test]
    fn test_retryable() {
        assert!(ReadyError::unavailable("busy").is_retryable());
        assert!(ReadyError::DeadlineExceeded { waited_ms: 10 }.is_retryable());
        assert!(!ReadyError::corrupt("bad").is_retryable());
        assert!(
            !ReadyError::RepositoryNotFound {
                path: PathBuf::from("x")
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_sqlite_errors_map_to_taxonomy() {
        let busy = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        assert!(matches!(
            ReadyError::from(busy),
            ReadyError::RepositoryUnavailable { .. }
        ));

        let corrupt = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CORRUPT),
            None,
        );
        assert!(matches!(
            ReadyError::from(corrupt),
            ReadyError::RepositoryCorrupt { .. }
        ));

        let not_db = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_NOTADB),
            None,
        );
        assert!(matches!(
            ReadyError::from(not_db),
            ReadyError::RepositoryCorrupt { .. }
        ));
    }

    #[test]
    fn test_suggestion() {
        let err = ReadyError::RepositoryNotFound {
            path: PathBuf::from("x"),
        };
        assert!(err.suggestion().is_some());
        assert_eq!(ReadyError::Config("bad".to_string()).suggestion(), None);
    }
}
