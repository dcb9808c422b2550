//! Wire types for the chatbot backend.

use serde::{Deserialize, Serialize};

use crate::session::turn::ConversationTurn;

/// Value of `status` reported by a successful knowledge-base run.
pub const INGESTION_SUCCESS: &str = "Success";

/// Body of `GET /chat-history`.
#[derive(Debug, Deserialize)]
pub struct ChatHistoryResponse {
    /// Turns in conversation order.
    pub chat_history: Vec<ConversationTurn>,
}

/// Body of `POST /chat-completion`.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    /// Query exactly as typed.
    pub query: &'a str,
}

/// Response of `POST /chat-completion`.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    /// Generated reply.
    pub chat_completion: String,
}

/// Response of `POST /gen-knowledgebase`.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct KnowledgeBaseResponse {
    /// `"Success"` or `"Failed"`.
    pub status: String,
    /// Failure detail, `null` on success.
    #[serde(default)]
    pub error: Option<String>,
}

/// Response of `GET /status`.
#[derive(Clone, Debug, Deserialize)]
pub struct StatusResponse {
    /// Human-readable connectivity message.
    pub status: String,
}

/// Outcome of a knowledge-base request that reached the server.
///
/// Non-success statuses are kept here rather than turned into errors because
/// the failure detail falls back to the status code.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IngestionReply {
    /// HTTP status code.
    pub http_status: u16,
    /// Parsed body, `None` when the body was not the expected JSON.
    pub body: Option<KnowledgeBaseResponse>,
}

impl IngestionReply {
    /// Success requires a 2xx status and a `"Success"` body status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.http_status)
            && self
                .body
                .as_ref()
                .is_some_and(|body| body.status == INGESTION_SUCCESS)
    }

    /// Best available failure detail: the body's `error`, else the status code.
    #[must_use]
    pub fn failure_detail(&self) -> String {
        self.body
            .as_ref()
            .and_then(|body| body.error.as_deref())
            .filter(|error| !error.trim().is_empty())
            .map_or_else(|| self.http_status.to_string(), str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(http_status: u16, status: &str, error: Option<&str>) -> IngestionReply {
        IngestionReply {
            http_status,
            body: Some(KnowledgeBaseResponse {
                status: status.to_string(),
                error: error.map(str::to_string),
            }),
        }
    }

    #[test]
    fn test_success_needs_status_and_body() {
        assert!(reply(200, "Success", None).is_success());
        assert!(!reply(200, "Failed", Some("timeout")).is_success());
        assert!(!reply(500, "Success", None).is_success());
    }

    #[test]
    fn test_detail_prefers_error_field() {
        assert_eq!(reply(200, "Failed", Some("timeout")).failure_detail(), "timeout");
    }

    #[test]
    fn test_detail_falls_back_to_status() {
        let missing_body = IngestionReply {
            http_status: 502,
            body: None,
        };
        assert_eq!(missing_body.failure_detail(), "502");
        assert_eq!(reply(500, "Failed", Some("")).failure_detail(), "500");
    }

    #[test]
    fn test_null_error_deserializes() {
        let body: KnowledgeBaseResponse =
            serde_json::from_str(r#"{"status":"Success","error":null}"#).unwrap();
        assert_eq!(body.error, None);
    }
}
