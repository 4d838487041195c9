//! Error types for the Prompt Library client.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::models::DecodeError;

/// Boxed error used as the source of transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur when using the Prompt Library client.
#[derive(Debug, Error)]
pub enum PromptLibraryError {
    /// The request did not complete within the configured timeout.
    #[error("Request timeout after {}s", .timeout.as_secs_f64())]
    Timeout {
        /// The configured client timeout
        timeout: Duration,
    },

    /// The request failed below HTTP (DNS, refused connection, TLS, ...).
    #[error("Network error: {source}")]
    Network {
        /// The underlying transport error
        source: BoxError,
    },

    /// The server answered with a body that is not the expected JSON.
    #[error("Invalid JSON response: {message}")]
    MalformedResponse {
        /// What was wrong with the body
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("{message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// The `error` field of the body, or `HTTP {status}`
        message: String,
        /// The parsed error body, when it was JSON
        body: Option<Value>,
    },

    /// The body was valid JSON but the prompt content did not match the content model.
    #[error("Invalid prompt content: {0}")]
    Decode(#[from] DecodeError),

    /// The client configuration cannot be used.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What was wrong with the configuration
        message: String,
    },
}

impl PromptLibraryError {
    /// Creates a malformed response error with the given message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error with the given message.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Builds an API error from a status code and the (possibly empty) response body.
    ///
    /// The message is taken from the body's `error` field when it is a string.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let body = serde_json::from_slice::<Value>(body).ok();
        let message = body
            .as_ref()
            .and_then(|body| body.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status));

        Self::Api {
            status,
            message,
            body,
        }
    }

    /// Returns the human readable error message.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Returns the HTTP status code for API errors.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the parsed response body for API errors.
    pub fn response_body(&self) -> Option<&Value> {
        match self {
            Self::Api { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Returns `true` if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if the server reported that the prompt does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

impl From<serde_json::Error> for PromptLibraryError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(err.to_string())
    }
}
