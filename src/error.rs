//! Error types for docgate.

use thiserror::Error;

/// Main error type for docgate operations.
#[derive(Error, Debug)]
pub enum DocgateError {
    /// The quota (limit or window) is not usable
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A caller gave up while waiting for admission
    #[error("Cancelled while waiting for rate limit admission")]
    Cancelled,

    /// The transport failed to deliver the request, or the API rejected it
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The payload could not be serialized to JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced by a transport while performing a single call.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request never produced a response (connect, TLS, timeout, body read)
    #[error("request failed: {0}")]
    Request(String),

    /// The API answered with a non-success status
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body as returned by the API
        body: String,
    },
}

impl From<config::ConfigError> for DocgateError {
    fn from(err: config::ConfigError) -> Self {
        DocgateError::Config(err.to_string())
    }
}

/// Result type alias for docgate operations.
pub type Result<T> = std::result::Result<T, DocgateError>;
