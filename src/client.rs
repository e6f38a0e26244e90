//! Rate-limited submission of documents to the document API.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::config::DocgateConfig;
use crate::document::{Document, DocumentRequest};
use crate::error::Result;
use crate::ratelimit::{InFlightLimit, RateGate};
use crate::transport::{HttpTransport, Transport, TransportResponse};

/// Default create-document endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://ismp.crpt.ru/api/v3/lk/documents/create";

/// Client that passes every call through a shared [`RateGate`].
///
/// Cloning is cheap and clones share the gate, so all clones together stay
/// within one quota.
pub struct SubmissionClient<T: Transport> {
    gate: Arc<RateGate>,
    transport: Arc<T>,
    endpoint: String,
    in_flight: Option<InFlightLimit>,
    acquire_timeout: Option<Duration>,
}

impl<T: Transport> Clone for SubmissionClient<T> {
    fn clone(&self) -> Self {
        Self {
            gate: Arc::clone(&self.gate),
            transport: Arc::clone(&self.transport),
            endpoint: self.endpoint.clone(),
            in_flight: self.in_flight.clone(),
            acquire_timeout: self.acquire_timeout,
        }
    }
}

impl SubmissionClient<HttpTransport> {
    /// Build an HTTP client from configuration.
    pub fn from_config(config: &DocgateConfig) -> Result<Self> {
        let quota = config.rate_limiting.quota()?;
        let transport = HttpTransport::new(Duration::from_millis(config.api.request_timeout_ms))?;

        let mut client = Self::new(Arc::new(RateGate::new(quota)), Arc::new(transport))
            .with_endpoint(config.api.endpoint.clone());

        if let Some(max) = config.rate_limiting.max_in_flight {
            client = client.with_in_flight_limit(InFlightLimit::new(max)?);
        }
        if let Some(ms) = config.rate_limiting.acquire_timeout_ms {
            client = client.with_acquire_timeout(Duration::from_millis(ms));
        }

        Ok(client)
    }
}

impl<T: Transport> SubmissionClient<T> {
    /// Create a client posting to [`DEFAULT_ENDPOINT`].
    pub fn new(gate: Arc<RateGate>, transport: Arc<T>) -> Self {
        Self {
            gate,
            transport,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            in_flight: None,
            acquire_timeout: None,
        }
    }

    /// Post to a different endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Additionally cap the number of transport calls running at once.
    ///
    /// The permit is held only around the transport call, after admission.
    pub fn with_in_flight_limit(mut self, limit: InFlightLimit) -> Self {
        self.in_flight = Some(limit);
        self
    }

    /// Give up with `Cancelled` if admission takes longer than `timeout`.
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = Some(timeout);
        self
    }

    /// The gate shared by this client and its clones.
    pub fn gate(&self) -> &Arc<RateGate> {
        &self.gate
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Register `document` with its detached `signature`.
    pub async fn create_document(
        &self,
        document: &Document,
        signature: &str,
    ) -> Result<TransportResponse> {
        self.submit(&DocumentRequest::new(document, signature)).await
    }

    /// Wait for admission, then post `payload` exactly once.
    ///
    /// The payload is serialized before waiting so that a payload which
    /// cannot be encoded never takes a slot. Transport failures are returned
    /// as they are; nothing is retried.
    #[instrument(skip(self, payload), fields(endpoint = %self.endpoint))]
    pub async fn submit<P: Serialize + ?Sized>(&self, payload: &P) -> Result<TransportResponse> {
        let body = serde_json::to_string(payload)?;

        let admission = match self.acquire_timeout {
            Some(timeout) => self.gate.acquire_timeout(timeout).await?,
            None => self.gate.acquire().await,
        };
        debug!(position = admission.position, "Admitted, sending document");

        let _permit = match &self.in_flight {
            Some(limit) => Some(limit.acquire().await),
            None => None,
        };

        match self.transport.post_json(&self.endpoint, body).await {
            Ok(response) => {
                info!(status = response.status, body = %response.body, "Document submitted");
                Ok(response)
            }
            Err(e) => {
                warn!(error = %e, "Document submission failed");
                Err(e.into())
            }
        }
    }
}
