//! HTTP transport backed by `reqwest`.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use super::{Transport, TransportResponse};
use crate::error::{DocgateError, Result, TransportError};

/// Single-attempt JSON POST over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport whose calls fail after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DocgateError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(
        &self,
        url: &str,
        body: String,
    ) -> std::result::Result<TransportResponse, TransportError> {
        debug!(url = %url, bytes = body.len(), "Sending POST");

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        if (200..300).contains(&status) {
            Ok(TransportResponse { status, body: text })
        } else {
            warn!(url = %url, status, "Document API returned non-success status");
            Err(TransportError::Status { status, body: text })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single request with a canned response; returns the raw request.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/api/v3/lk/documents/create", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let content_length = text[..end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if raw.len() >= end + 4 + content_length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }

            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&raw).to_string()
        });

        (url, handle)
    }

    #[tokio::test]
    async fn test_post_json_success() {
        let (url, server) = serve_once("HTTP/1.1 200 OK", r#"{"value":"ok"}"#).await;
        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();

        let response = transport
            .post_json(&url, r#"{"signature":"s"}"#.to_string())
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"{"value":"ok"}"#);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/v3/lk/documents/create"));
        assert!(request.to_ascii_lowercase().contains("content-type: application/json"));
        assert!(request.ends_with(r#"{"signature":"s"}"#));
    }

    #[tokio::test]
    async fn test_post_json_non_success_status() {
        let (url, server) = serve_once("HTTP/1.1 400 Bad Request", r#"{"error_message":"bad"}"#).await;
        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();

        let err = transport.post_json(&url, "{}".to_string()).await.unwrap_err();
        match err {
            TransportError::Status { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("bad"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_post_json_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let err = transport
            .post_json(&format!("http://{}/", addr), "{}".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Request(_)));
    }
}
