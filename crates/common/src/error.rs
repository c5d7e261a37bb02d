//! Error types shared across ClipSync crates.

use std::path::PathBuf;

/// Top-level error type for ClipSync operations.
///
/// Every failure is scoped to the single user action that triggered it;
/// nothing here is meant to terminate the process.
#[derive(Debug, thiserror::Error)]
pub enum ClipsyncError {
    /// An operation required an active session and there was none.
    #[error("Not authenticated: an active session is required")]
    NotAuthenticated,

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Transfer failed for {path}: {message}")]
    TransferFailed { path: String, message: String },

    #[error("Query failed: {message}")]
    QueryFailed { message: String },

    /// The blob landed but the metadata store refused the record.
    #[error("Record write failed for {path}: {message}")]
    RecordWriteFailed { path: String, message: String },

    #[error("Capture error: {message}")]
    Capture { message: String },

    #[error("Authentication error ({code}): {message}")]
    Auth { code: String, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ClipsyncError.
pub type ClipsyncResult<T> = Result<T, ClipsyncError>;

impl ClipsyncError {
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: msg.into(),
        }
    }

    pub fn transfer_failed(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::TransferFailed {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn query_failed(msg: impl Into<String>) -> Self {
        Self::QueryFailed {
            message: msg.into(),
        }
    }

    pub fn record_write_failed(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::RecordWriteFailed {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn auth(code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Auth {
            code: code.into(),
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this error means the caller has to sign in first.
    pub fn is_not_authenticated(&self) -> bool {
        matches!(self, Self::NotAuthenticated)
    }
}
