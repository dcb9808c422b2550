//! Error types for the backend HTTP layer.

use thiserror::Error;

/// Errors raised while talking to the chatbot backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connect, timeout, body read).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Backend answered with a non-success status.
    #[error("backend returned status {0}")]
    Status(u16),

    /// Body did not have the expected shape.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status(code) => Some(*code),
            Self::HttpRequest(err) => err.status().as_ref().map(reqwest::StatusCode::as_u16),
            _ => None,
        }
    }

    /// Whether resubmitting the same request could succeed.
    ///
    /// The session never retries on its own; front ends use this to word
    /// their error message.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpRequest(err) => err.is_timeout() || err.is_connect(),
            Self::Status(code) => *code >= 500 || *code == 429,
            _ => false,
        }
    }
}

/// Convenience result alias for backend calls.
pub type ApiResult<T> = Result<T, ApiError>;
