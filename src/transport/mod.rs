//! Transport abstraction for delivering serialized payloads.

mod http;

pub use http::HttpTransport;

use async_trait::async_trait;

use crate::error::TransportError;

/// Status and body of a successful call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Trait for transport implementations.
///
/// A transport performs exactly one POST of `body` to `url` with a JSON
/// content type. It must not retry; a non-success status is reported as
/// [`TransportError::Status`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        body: String,
    ) -> std::result::Result<TransportResponse, TransportError>;
}
