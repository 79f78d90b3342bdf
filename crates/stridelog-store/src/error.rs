//! Error types for stridelog-store.

use std::path::PathBuf;

/// Result type for stridelog-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in stridelog-store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error from SQLite. The underlying persistence is unreachable
    /// or refused the operation; callers may retry later.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to create database directory.
    #[error("Failed to create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input rejected before any write was attempted.
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// User not found in database.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Email address is already registered.
    #[error("Email already registered: {0}")]
    EmailTaken(String),
}

impl Error {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}
