//! Error types for jobly

use std::time::Duration;
use thiserror::Error;

/// Result type alias for jobly operations
pub type JoblyResult<T> = Result<T, JoblyError>;

/// Error types for fragment building and data access
#[derive(Debug, Error)]
pub enum JoblyError {
    /// Caller-supplied data cannot be turned into SQL (empty update, unknown column, bad identifier)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A minimum filter bound exceeds its maximum
    #[error("Range error: {0}")]
    Range(String),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint violation or explicit duplicate check
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Query timeout error
    #[error("Query timeout after {0:?}")]
    Timeout(Duration),

    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl JoblyError {
    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a range error
    pub fn range(message: impl Into<String>) -> Self {
        Self::Range(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if the caller sent something the server refuses to act on.
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::Range(_) | Self::Duplicate(_)
        )
    }

    /// HTTP status an outer layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) | Self::Range(_) | Self::Duplicate(_) => 400,
            Self::NotFound(_) => 404,
            Self::Timeout(_) => 504,
            Self::Connection(_) | Self::Query(_) | Self::Decode { .. } | Self::Config(_) => 500,
        }
    }

    /// Parse a tokio_postgres error into a more specific JoblyError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = db_err.message();

            match db_err.code().code() {
                "23505" => return Self::Duplicate(format!("{constraint}: {message}")),
                "23503" => return Self::InvalidInput(format!("{constraint}: {message}")),
                _ => {}
            }
        }
        Self::Query(err)
    }
}
