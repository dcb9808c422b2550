//! Error taxonomy of the chat session.
//!
//! None of these end a session. Each is recovered by the component that
//! triggered it and reported through an outcome value.

use thiserror::Error;

use crate::api::error::ApiError;

/// Chat session error type.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No credential: the user must authenticate first.
    #[error("authentication required")]
    AuthMissing,
    /// History could not be loaded; the session starts with an empty transcript.
    #[error("chat history unavailable: {0}")]
    HistoryUnavailable(#[source] ApiError),
    /// Completion failed; transcript and pending query are untouched.
    #[error("chat completion failed: {0}")]
    CompletionFailed(#[source] ApiError),
    /// Knowledge-base generation failed; carries the best available detail.
    #[error("knowledge base generation failed: {detail}")]
    IngestionFailed {
        /// Backend `error` field, HTTP status code, or transport error text.
        detail: String,
    },
}

impl SessionError {
    /// Whether the user should be sent back to authenticate.
    #[must_use]
    pub const fn needs_auth(&self) -> bool {
        matches!(self, Self::AuthMissing)
    }
}

/// Convenience result alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
