//! Error types for anonfs.

use thiserror::Error;

/// Common error type for anonfs.
#[derive(Error, Debug)]
pub enum AnonfsError {
    /// The path is malformed (empty interior segment, bad leaf name, ...).
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The parent of the target path is missing or is not a directory.
    #[error("parent directory not found: {0}")]
    ParentNotFound(String),

    /// A sibling with the same name already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Node not found.
    #[error("{0} not found")]
    NotFound(String),

    /// The remote provider answered with an error envelope.
    ///
    /// `code` and `message` are passed through verbatim from the provider.
    #[error("remote rejected upload ({code}): {message}")]
    RemoteRejected { code: String, message: String },

    /// The remote provider could not be reached or answered with garbage.
    #[error("remote unavailable: {0}")]
    RemoteUnavailable(String),

    /// Malformed request parameter (numeric id, root mutation, ...).
    #[error("parameter error: {0}")]
    Parameter(String),

    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for AnonfsError {
    fn from(e: sqlx::Error) -> Self {
        AnonfsError::Database(e.to_string())
    }
}

/// Result type alias for anonfs operations.
pub type Result<T> = std::result::Result<T, AnonfsError>;
