//! Configuration for the Prompt Library client.

use std::collections::BTreeMap;
use std::time::Duration;

use typed_builder::TypedBuilder;

use crate::error::PromptLibraryError;

/// Default timeout applied to every request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable holding the service base URL
pub const BASE_URL_ENV: &str = "PLP_BASE_URL";
/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "PLP_API_KEY";
/// Environment variable holding the timeout in seconds
pub const TIMEOUT_ENV: &str = "PLP_TIMEOUT_SECS";

/// Connection parameters for a Prompt Library server
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
#[builder(doc)]
pub struct ClientConfig {
    /// Base URL of the server (e.g., "https://prompts.goreal.ai")
    #[builder(setter(into))]
    pub base_url: String,
    /// Optional API key sent as a bearer token
    #[builder(default, setter(strip_option, into))]
    pub api_key: Option<String>,
    /// Additional HTTP headers sent with every request
    #[builder(default)]
    pub headers: BTreeMap<String, String>,
    /// Timeout applied to each request as a whole
    #[builder(default = DEFAULT_TIMEOUT)]
    pub timeout: Duration,
}

impl ClientConfig {
    /// Creates a configuration for the given server with default settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::builder().base_url(base_url).build()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `PLP_BASE_URL` - Base URL of the server (required)
    /// * `PLP_API_KEY` - API key for authentication (optional)
    /// * `PLP_TIMEOUT_SECS` - Request timeout in seconds (optional)
    ///
    /// # Errors
    ///
    /// Returns [`PromptLibraryError::InvalidConfig`] if `PLP_BASE_URL` is not set or the
    /// timeout is not a usable number of seconds.
    pub fn from_env() -> Result<Self, PromptLibraryError> {
        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                PromptLibraryError::invalid_config(format!("{} must be set", BASE_URL_ENV))
            })?;
        let api_key = std::env::var(API_KEY_ENV).ok().filter(|key| !key.is_empty());
        let timeout = match std::env::var(TIMEOUT_ENV) {
            Ok(secs) => parse_timeout(&secs)?,
            Err(_) => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            base_url,
            api_key,
            headers: BTreeMap::new(),
            timeout,
        })
    }

    /// Adds an extra header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Returns the base URL without trailing slashes.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

fn parse_timeout(secs: &str) -> Result<Duration, PromptLibraryError> {
    secs.trim()
        .parse::<f64>()
        .ok()
        .filter(|secs| *secs > 0.0)
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| {
            PromptLibraryError::invalid_config(format!(
                "{} must be a positive number of seconds, got {:?}",
                TIMEOUT_ENV, secs
            ))
        })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::new("https://prompts.example.com");
        assert_eq!(config.api_key, None);
        assert!(config.headers.is_empty());
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn strips_trailing_slash() {
        let config = ClientConfig::new("https://prompts.example.com/");
        assert_eq!(config.normalized_base_url(), "https://prompts.example.com");

        let config = ClientConfig::new("http://localhost:8080/api//");
        assert_eq!(config.normalized_base_url(), "http://localhost:8080/api");
    }

    #[test]
    fn builder_sets_everything() {
        let config = ClientConfig::builder()
            .base_url("https://prompts.example.com")
            .api_key("test-key")
            .timeout(Duration::from_secs(3))
            .build()
            .with_header("X-Team", "growth");

        assert_eq!(config.api_key.as_deref(), Some("test-key"));
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.headers.get("X-Team").map(String::as_str), Some("growth"));
    }

    #[test]
    fn timeout_parsing() {
        assert_eq!(parse_timeout("2.5").unwrap(), Duration::from_millis(2500));
        assert_eq!(parse_timeout(" 30 ").unwrap(), Duration::from_secs(30));
        assert!(matches!(
            parse_timeout("soon"),
            Err(PromptLibraryError::InvalidConfig { .. })
        ));
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("-1").is_err());
        assert!(parse_timeout("NaN").is_err());
        assert!(parse_timeout("inf").is_err());
    }

    #[test]
    fn oversized_timeout_is_rejected() {
        for secs in ["1e300", "1e20"] {
            assert!(
                matches!(
                    parse_timeout(secs),
                    Err(PromptLibraryError::InvalidConfig { .. })
                ),
                "{} was accepted",
                secs
            );
        }
    }

    // Every test touching PLP_* variables holds this lock.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn set_env(vars: &[(&str, Option<&str>)]) {
        for (name, value) in vars {
            match value {
                Some(value) => std::env::set_var(name, value),
                None => std::env::remove_var(name),
            }
        }
    }

    #[test]
    fn from_env_paths() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());

        set_env(&[(BASE_URL_ENV, None), (API_KEY_ENV, None), (TIMEOUT_ENV, None)]);
        let err = ClientConfig::from_env().unwrap_err();
        assert!(matches!(err, PromptLibraryError::InvalidConfig { .. }));
        assert!(err.message().contains(BASE_URL_ENV));

        set_env(&[(BASE_URL_ENV, Some("https://prompts.example.com/"))]);
        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.normalized_base_url(), "https://prompts.example.com");
        assert_eq!(config.api_key, None);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);

        set_env(&[(API_KEY_ENV, Some("")), (TIMEOUT_ENV, Some("2.5"))]);
        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.api_key, None);
        assert_eq!(config.timeout, Duration::from_millis(2500));

        set_env(&[(API_KEY_ENV, Some("env-key"))]);
        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.api_key.as_deref(), Some("env-key"));

        set_env(&[(TIMEOUT_ENV, Some("soon"))]);
        let err = ClientConfig::from_env().unwrap_err();
        assert!(matches!(err, PromptLibraryError::InvalidConfig { .. }));
        assert!(err.message().contains(TIMEOUT_ENV));

        set_env(&[(TIMEOUT_ENV, Some("1e300"))]);
        assert!(ClientConfig::from_env().is_err());

        set_env(&[(BASE_URL_ENV, None), (API_KEY_ENV, None), (TIMEOUT_ENV, None)]);
    }
}
