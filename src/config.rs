//! Configuration for the chat client.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Environment variable holding the backend base URL.
pub const API_URL_ENV: &str = "AI_SRE_API_URL";
/// Environment variable overriding the history/completion timeout (seconds).
pub const REQUEST_TIMEOUT_ENV: &str = "AI_SRE_REQUEST_TIMEOUT_SECS";
/// Environment variable overriding the ingestion timeout (seconds).
pub const INGESTION_TIMEOUT_ENV: &str = "AI_SRE_INGESTION_TIMEOUT_SECS";

/// Default backend base URL.
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
/// Route prefix of the chatbot API.
const DEFAULT_API_PREFIX: &str = "/api/ai-sre";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Base URL could not be parsed.
    #[error("invalid base url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// Base URL uses a scheme other than http/https.
    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),
    /// A numeric environment override could not be parsed.
    #[error("invalid value for {name}: {value}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Raw value found.
        value: String,
    },
    /// A timeout was zero.
    #[error("{0} must be > 0")]
    ZeroTimeout(&'static str),
}

/// Settings for talking to the chatbot backend.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend origin, e.g. `http://127.0.0.1:8000`.
    pub base_url: String,
    /// Prefix prepended to every chatbot route.
    pub api_prefix: String,
    /// Timeout for history and completion requests.
    #[serde(with = "duration_serde")]
    pub request_timeout: Duration,
    /// Timeout for knowledge-base generation.
    #[serde(with = "duration_serde")]
    pub ingestion_timeout: Duration,
    /// Connection timeout.
    #[serde(with = "duration_serde")]
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            request_timeout: Duration::from_secs(120),
            ingestion_timeout: Duration::from_secs(30 * 60),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Create a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load defaults overridden by `AI_SRE_*` environment variables.
    ///
    /// # Errors
    /// Returns an error if an override is malformed or the result is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let url = std::env::var(API_URL_ENV).unwrap_or_default();
        if !url.trim().is_empty() {
            config.base_url = url.trim().to_string();
        }
        if let Some(secs) = env_secs(REQUEST_TIMEOUT_ENV)? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_secs(INGESTION_TIMEOUT_ENV)? {
            config.ingestion_timeout = Duration::from_secs(secs);
        }
        config.validate()?;
        Ok(config)
    }

    /// Set the backend base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the history/completion timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the ingestion timeout.
    #[must_use]
    pub const fn with_ingestion_timeout(mut self, timeout: Duration) -> Self {
        self.ingestion_timeout = timeout;
        self
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if the URL is unusable or a timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(url.scheme().to_string()));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("request_timeout"));
        }
        if self.ingestion_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("ingestion_timeout"));
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("connect_timeout"));
        }
        Ok(())
    }

    /// Absolute URL of a chatbot route, e.g. `chat-history`.
    ///
    /// # Errors
    /// Returns an error if the joined URL does not parse.
    pub fn api_url(&self, route: &str) -> Result<Url, url::ParseError> {
        let prefix = self.api_prefix.trim_matches('/');
        let route = route.trim_start_matches('/');
        if prefix.is_empty() {
            self.root_url(route)
        } else {
            self.root_url(&format!("{prefix}/{route}"))
        }
    }

    /// Absolute URL of a route outside the chatbot prefix, e.g. `status`.
    ///
    /// # Errors
    /// Returns an error if the joined URL does not parse.
    pub fn root_url(&self, route: &str) -> Result<Url, url::ParseError> {
        Url::parse(&format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            route.trim_start_matches('/')
        ))
    }
}

fn env_secs(name: &'static str) -> Result<Option<u64>, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { name, value }),
        Err(_) => Ok(None),
    }
}

/// Serde module for Duration serialization.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
