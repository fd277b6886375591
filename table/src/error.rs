//! Error types for the remote table client

use thiserror::Error;

/// Errors that can occur when talking to the remote table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// A required configuration value is absent
    #[error("Missing {0} environment variable")]
    MissingConfig(&'static str),

    /// HTTP request failed before a response arrived
    #[error("Request failed: {0}")]
    Request(String),

    /// The API key was rejected
    #[error("Unauthorized - check the API key and row level security policies")]
    Unauthorized,

    /// The table returned a non-success status
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Response body could not be decoded
    #[error("Response parsing failed: {0}")]
    ResponseParse(String),
}

/// Result alias for table operations
pub type Result<T> = std::result::Result<T, TableError>;
