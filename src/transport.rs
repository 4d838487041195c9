//! HTTP transport used by the client.
//!
//! The client only needs one capability from the network: send a request with a method,
//! path, optional JSON body and headers, and get back the status code and raw body.
//! [`HttpTransport`] provides it on top of `reqwest`; tests and embedders can supply
//! their own [`Transport`].

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::error::{BoxError, PromptLibraryError};

/// A request handed to the transport.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method
    pub method: Method,
    /// Path relative to the server base URL, starting with `/`
    pub path: String,
    /// Optional JSON body
    pub body: Option<Value>,
    /// Headers to send
    pub headers: HeaderMap,
}

/// The raw response returned by the transport.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Raw response body
    pub body: Vec<u8>,
}

/// Failures below the HTTP layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,
    /// The request could not be completed.
    #[error(transparent)]
    Network(BoxError),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(Box::new(err))
        }
    }
}

/// Performs a single HTTP round-trip.
#[async_trait]
pub trait Transport: fmt::Debug + Send + Sync {
    /// Sends the request and returns the status and body.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// `reqwest`-backed transport with a per-client timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Creates a transport for the given base URL.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Server URL; trailing slashes are removed
    /// * `timeout` - Applied to the whole request, including reading the body
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, PromptLibraryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| {
                PromptLibraryError::invalid_config(format!("failed to build HTTP client: {}", err))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!(method = %request.method, url = %url, "sending HTTP request");

        let mut builder = self
            .client
            .request(request.method, &url)
            .headers(request.headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        debug!(status = status.as_u16(), bytes = body.len(), "received HTTP response");

        Ok(TransportResponse { status, body })
    }
}
