//! Client implementation for the Prompt Library API.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::PromptLibraryError;
use crate::models::{PromptEnvelope, PromptInput};
use crate::transport::{HttpTransport, Transport, TransportError, TransportRequest};

/// Path prefix of the prompt endpoints
const PROMPTS_PATH: &str = "/v1/prompts";

/// A client for reading and writing prompts in a Prompt Library.
///
/// Every operation performs exactly one HTTP round-trip. The client holds no per-call
/// state, so it can be cloned and shared between tasks.
///
/// # Example
///
/// ```no_run
/// use prompt_library_client::PromptLibraryClient;
///
/// # async fn run() -> Result<(), prompt_library_client::error::PromptLibraryError> {
/// let client = PromptLibraryClient::with_api_key("https://prompts.goreal.ai", "your-key")?;
/// let prompt = client.get("marketing/welcome-email", None).await?;
/// println!("{}", prompt.content.text_only());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PromptLibraryClient<T = HttpTransport> {
    config: ClientConfig,
    headers: HeaderMap,
    transport: T,
}

impl PromptLibraryClient<HttpTransport> {
    /// Creates a client for the given server without authentication.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, PromptLibraryError> {
        Self::from_config(ClientConfig::new(base_url))
    }

    /// Creates a client that authenticates with a bearer API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not a valid header value or the HTTP client
    /// cannot be built.
    pub fn with_api_key(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, PromptLibraryError> {
        Self::from_config(
            ClientConfig::builder()
                .base_url(base_url)
                .api_key(api_key)
                .build(),
        )
    }

    /// Creates a client from a full configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured header is invalid or the HTTP client cannot be
    /// built.
    pub fn from_config(config: ClientConfig) -> Result<Self, PromptLibraryError> {
        let transport = HttpTransport::new(config.normalized_base_url(), config.timeout)?;
        Self::with_transport(config, transport)
    }

    /// Creates a client from the `PLP_*` environment variables.
    ///
    /// See [`ClientConfig::from_env`].
    ///
    /// # Errors
    ///
    /// Returns an error if the required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, PromptLibraryError> {
        Self::from_config(ClientConfig::from_env()?)
    }
}

impl<T: Transport> PromptLibraryClient<T> {
    /// Creates a client that sends its requests through a custom transport.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured header name or value is invalid.
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self, PromptLibraryError> {
        let headers = build_headers(&config)?;
        Ok(Self {
            config,
            headers,
            transport,
        })
    }

    /// Returns the base URL without trailing slashes.
    pub fn base_url(&self) -> &str {
        self.config.normalized_base_url()
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the transport used by this client.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Retrieves a prompt by ID and optional version.
    ///
    /// # Arguments
    ///
    /// * `prompt_id` - The prompt identifier (e.g., "marketing/welcome-email")
    /// * `version` - Optional version (e.g., "1.2.0"). If omitted, the latest is returned.
    ///
    /// # Errors
    ///
    /// Returns [`PromptLibraryError::Api`] with a 404 status if the prompt does not exist,
    /// or another error if the request fails or the response cannot be decoded.
    pub async fn get(
        &self,
        prompt_id: &str,
        version: Option<&str>,
    ) -> Result<PromptEnvelope, PromptLibraryError> {
        let path = match version.filter(|version| !version.is_empty()) {
            Some(version) => format!("{}/{}/{}", PROMPTS_PATH, prompt_id, version),
            None => prompt_path(prompt_id),
        };

        let data = self.request(Method::GET, path, None).await?;
        decode_envelope(data)
    }

    /// Creates or updates a prompt (idempotent upsert).
    ///
    /// # Arguments
    ///
    /// * `prompt_id` - The prompt identifier
    /// * `input` - The prompt content and metadata
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the saved envelope cannot be decoded.
    pub async fn put(
        &self,
        prompt_id: &str,
        input: &PromptInput,
    ) -> Result<PromptEnvelope, PromptLibraryError> {
        let data = self
            .request(Method::PUT, prompt_path(prompt_id), Some(input.encode()))
            .await?;
        decode_envelope(data)
    }

    /// Deletes a prompt and all its versions.
    ///
    /// # Errors
    ///
    /// Returns [`PromptLibraryError::Api`] with a 404 status if the prompt does not exist,
    /// or another error if the request fails.
    pub async fn delete(&self, prompt_id: &str) -> Result<(), PromptLibraryError> {
        self.request(Method::DELETE, prompt_path(prompt_id), None)
            .await
            .map(|_| ())
    }

    /// Alias for [`get`](Self::get).
    pub async fn fetch(
        &self,
        prompt_id: &str,
        version: Option<&str>,
    ) -> Result<PromptEnvelope, PromptLibraryError> {
        self.get(prompt_id, version).await
    }

    /// Alias for [`put`](Self::put).
    pub async fn save(
        &self,
        prompt_id: &str,
        input: &PromptInput,
    ) -> Result<PromptEnvelope, PromptLibraryError> {
        self.put(prompt_id, input).await
    }

    /// Closes the client and releases its connections.
    ///
    /// Dropping the client has the same effect; this makes the end of its lifetime
    /// explicit.
    pub fn close(self) {
        debug!(base_url = %self.base_url(), "closing prompt library client");
    }

    /// Sends a request and returns the parsed JSON body, or `None` for empty responses.
    async fn request(
        &self,
        method: Method,
        path: String,
        body: Option<Value>,
    ) -> Result<Option<Value>, PromptLibraryError> {
        debug!(method = %method, path = %path, "prompt library request");

        let response = self
            .transport
            .send(TransportRequest {
                method: method.clone(),
                path: path.clone(),
                body,
                headers: self.headers.clone(),
            })
            .await
            .map_err(|err| {
                warn!(method = %method, path = %path, error = %err, "prompt library transport failure");
                match err {
                    TransportError::Timeout => PromptLibraryError::Timeout {
                        timeout: self.config.timeout,
                    },
                    TransportError::Network(source) => PromptLibraryError::Network { source },
                }
            })?;

        let status = response.status;
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        if !status.is_success() {
            let err = PromptLibraryError::from_response(status.as_u16(), &response.body);
            warn!(method = %method, path = %path, status = status.as_u16(), error = %err, "prompt library request failed");
            return Err(err);
        }

        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        Ok(Some(serde_json::from_slice(&response.body)?))
    }
}

fn prompt_path(prompt_id: &str) -> String {
    format!("{}/{}", PROMPTS_PATH, prompt_id)
}

fn decode_envelope(data: Option<Value>) -> Result<PromptEnvelope, PromptLibraryError> {
    let data = data.ok_or_else(|| PromptLibraryError::malformed("empty response body"))?;
    PromptEnvelope::decode(&data)
}

/// Content type first, then caller headers, then the API key so that it always wins.
fn build_headers(config: &ClientConfig) -> Result<HeaderMap, PromptLibraryError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
            PromptLibraryError::invalid_config(format!("invalid header name {:?}: {}", name, err))
        })?;
        let value = HeaderValue::from_str(value).map_err(|err| {
            PromptLibraryError::invalid_config(format!("invalid value for header {}: {}", name, err))
        })?;
        headers.insert(name, value);
    }

    if let Some(api_key) = &config.api_key {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| PromptLibraryError::invalid_config("API key is not a valid header value"))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Ok(headers)
}
