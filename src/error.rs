//! Error types for agora.

use thiserror::Error;

/// Common error type for agora.
#[derive(Error, Debug)]
pub enum AgoraError {
    /// Database error.
    ///
    /// Storage or transaction failure. Opaque to API callers.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Referenced user, forum, thread or post does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Requested state conflicts with existing data.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The request itself is invalid.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl AgoraError {
    /// Shorthand for a `NotFound` error.
    pub fn not_found(what: impl Into<String>) -> Self {
        AgoraError::NotFound(what.into())
    }
}

// Conversion from sqlx errors
impl From<sqlx::Error> for AgoraError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AgoraError::Conflict(db_err.message().to_string())
            }
            _ => AgoraError::Database(e.to_string()),
        }
    }
}

/// Result type alias for agora operations.
pub type Result<T> = std::result::Result<T, AgoraError>;
