//! Error types for taskdex
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (unknown user/task, duplicate id, bad arguments)
//! - 4: Operation failed (I/O, config parsing, serialization)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the taskdex CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for taskdex operations
#[derive(Error, Debug)]
pub enum Error {
    // Not-found / duplicate signals from the task index (exit code 2)
    #[error("User already registered: {0}")]
    UserExists(u32),

    #[error("User not found: {0}")]
    UserNotFound(u32),

    #[error("Task {task_id} not found for user {user_id}")]
    TaskNotFound { user_id: u32, task_id: u32 },

    // Collaborator input errors (exit code 2)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid priority {0} (expected 1-10)")]
    InvalidPriority(i64),

    #[error("Invalid date '{value}' (expected format {format})")]
    InvalidDate { value: String, format: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{failed} script command(s) failed (first at line {line})")]
    ScriptFailed { failed: usize, line: usize },

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Failed to write report {}: {source}", path.display())]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::UserExists(_)
            | Error::UserNotFound(_)
            | Error::TaskNotFound { .. }
            | Error::InvalidArgument(_)
            | Error::InvalidPriority(_)
            | Error::InvalidDate { .. }
            | Error::InvalidConfig(_)
            | Error::ScriptFailed { .. } => exit_codes::USER_ERROR,

            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::ReportWrite { .. } => exit_codes::OPERATION_FAILED,
        }
    }

    /// Short machine-readable classification used in JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UserExists(_) => "duplicate",
            Error::UserNotFound(_) | Error::TaskNotFound { .. } => "not_found",
            Error::InvalidArgument(_)
            | Error::InvalidPriority(_)
            | Error::InvalidDate { .. }
            | Error::InvalidConfig(_)
            | Error::ScriptFailed { .. } => "user_error",
            _ => "operation_failed",
        }
    }

    /// Structured details for JSON error envelopes, when the variant has any
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::UserExists(id) | Error::UserNotFound(id) => {
                Some(serde_json::json!({ "user_id": id }))
            }
            Error::TaskNotFound { user_id, task_id } => {
                Some(serde_json::json!({ "user_id": user_id, "task_id": task_id }))
            }
            Error::ScriptFailed { failed, line } => {
                Some(serde_json::json!({ "failed": failed, "line": line }))
            }
            Error::ReportWrite { path, .. } => Some(serde_json::json!({ "path": path })),
            _ => None,
        }
    }
}

/// Result type alias for taskdex operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
