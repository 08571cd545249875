//! Common error types for Sonicstride

use thiserror::Error;

/// Common result type for Sonicstride operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Sonicstride crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored JSON document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource (or a referenced parent) not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed or out-of-range input, rejected before any write
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Internal error (corrupt stored value, unexpected state)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound(what.into())
    }

    pub fn validation(what: impl Into<String>) -> Self {
        Error::Validation(what.into())
    }
}
