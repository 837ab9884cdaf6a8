//! Structured error output for AI coding agents.
//!
//! Provides machine-parseable error information with:
//! - Error codes for categorization
//! - Hints for self-correction
//! - Retryability flags
//! - Context for debugging

use crate::error::ReadyError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Machine-readable error codes.
///
/// These codes are stable and can be used for programmatic error handling.
/// Format: `SCREAMING_SNAKE_CASE` for easy parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // === Repository Errors (exit code 2) ===
    /// Issue store not found for the workspace
    RepositoryNotFound,
    /// Issue store could not be reached
    RepositoryUnavailable,
    /// Issue store contents are unreadable
    RepositoryCorrupt,
    /// A record violates the minimal schema
    SchemaViolation,
    /// Snapshot acquisition exceeded the deadline
    DeadlineExceeded,

    // === Config Errors (exit code 7) ===
    /// Configuration error
    ConfigError,

    // === I/O Errors (exit code 8) ===
    /// File I/O error
    IoError,
    /// JSON serialization error
    JsonError,
    /// YAML parsing error
    YamlError,

    // === Internal Errors (exit code 1) ===
    /// Unexpected internal error
    InternalError,
}

impl ErrorCode {
    /// Get the string representation for JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RepositoryNotFound => "REPOSITORY_NOT_FOUND",
            Self::RepositoryUnavailable => "REPOSITORY_UNAVAILABLE",
            Self::RepositoryCorrupt => "REPOSITORY_CORRUPT",
            Self::SchemaViolation => "SCHEMA_VIOLATION",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::YamlError => "YAML_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Whether this error is potentially retryable without changing input.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RepositoryUnavailable | Self::DeadlineExceeded)
    }

    /// Get the exit code for this error category.
    ///
    /// - 1: Internal/unknown errors
    /// - 2: Repository errors
    /// - 7: Config errors
    /// - 8: I/O errors
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::RepositoryNotFound
            | Self::RepositoryUnavailable
            | Self::RepositoryCorrupt
            | Self::SchemaViolation
            | Self::DeadlineExceeded => 2,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError | Self::YamlError => 8,
            Self::InternalError => 1,
        }
    }
}

/// Structured error for machine-parseable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether the operation can be retried
    pub retryable: bool,
    /// Additional context data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl StructuredError {
    /// Create a new structured error from a `ReadyError`.
    #[must_use]
    pub fn from_error(err: &ReadyError) -> Self {
        let (code, context) = Self::extract_code_and_context(err);

        Self {
            code,
            message: err.to_string(),
            hint: err.suggestion().map(str::to_string),
            retryable: code.is_retryable(),
            context,
        }
    }

    /// Serialize to JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "hint": self.hint,
                "retryable": self.retryable,
                "context": self.context,
            }
        })
    }

    /// Format for human-readable output.
    #[must_use]
    pub fn to_human(&self, color: bool) -> String {
        let mut output = String::new();

        if color {
            output.push_str("\x1b[31mError:\x1b[0m ");
        } else {
            output.push_str("Error: ");
        }

        output.push_str(&self.message);

        if let Some(hint) = &self.hint {
            output.push('\n');
            if color {
                output.push_str("\x1b[33mHint:\x1b[0m ");
            } else {
                output.push_str("Hint: ");
            }
            output.push_str(hint);
        }

        output
    }

    fn extract_code_and_context(err: &ReadyError) -> (ErrorCode, Option<Value>) {
        match err {
            ReadyError::RepositoryNotFound { path } => (
                ErrorCode::RepositoryNotFound,
                Some(json!({"path": path.display().to_string()})),
            ),
            ReadyError::RepositoryUnavailable { reason } => (
                ErrorCode::RepositoryUnavailable,
                Some(json!({"reason": reason})),
            ),
            ReadyError::RepositoryCorrupt { reason } => {
                (ErrorCode::RepositoryCorrupt, Some(json!({"reason": reason})))
            }
            ReadyError::SchemaViolation { reason } => {
                (ErrorCode::SchemaViolation, Some(json!({"reason": reason})))
            }
            ReadyError::DeadlineExceeded { waited_ms } => (
                ErrorCode::DeadlineExceeded,
                Some(json!({"waited_ms": waited_ms})),
            ),
            ReadyError::Config(_) => (ErrorCode::ConfigError, None),
            ReadyError::Io(_) => (ErrorCode::IoError, None),
            ReadyError::Json(_) => (ErrorCode::JsonError, None),
            ReadyError::Yaml(_) => (ErrorCode::YamlError, None),
            ReadyError::Other(_) => (ErrorCode::InternalError, None),
        }
    }
}
