//! Error types for adapters.

use thiserror::Error;

/// Errors that can occur when fetching regression results from a backend.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// The adapter could not be configured.
    #[error("Invalid adapter configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for AdapterError {
    fn from(err: serde_json::Error) -> Self {
        AdapterError::Parse(err.to_string())
    }
}

#[cfg(feature = "graphite")]
impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AdapterError::Timeout
        } else if err.is_connect() {
            AdapterError::Connection(err.to_string())
        } else if err.is_decode() {
            AdapterError::Parse(err.to_string())
        } else {
            AdapterError::Http(err.to_string())
        }
    }
}
