//! HTTP access to the chatbot backend.

pub mod client;
pub mod error;
pub mod types;

pub use client::{ApiFuture, ChatApi, HttpChatApi};
pub use error::{ApiError, ApiResult};
pub use types::{IngestionReply, KnowledgeBaseResponse};
