//! HTTP client for the chatbot backend.
//!
//! Routes (relative to `{base}/api/ai-sre`, all with a bearer token):
//! - `GET /chat-history`
//! - `POST /chat-completion` with `{ "query": ... }`
//! - `POST /gen-knowledgebase` with no body

use std::future::Future;
use std::pin::Pin;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, ACCEPT};

use crate::api::error::{ApiError, ApiResult};
use crate::api::types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatHistoryResponse, IngestionReply,
    KnowledgeBaseResponse, StatusResponse,
};
use crate::config::ClientConfig;
use crate::session::credential::Credential;
use crate::session::turn::ConversationTurn;

/// Boxed future type for backend calls.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Backend operations used by a chat session.
pub trait ChatApi: Send + Sync {
    /// Load the server-side history of the authenticated user.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-success status or malformed body.
    fn chat_history<'a>(
        &'a self,
        credential: &'a Credential,
    ) -> ApiFuture<'a, ApiResult<Vec<ConversationTurn>>>;

    /// Ask for a completion of `query` and return the reply text.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-success status or malformed body.
    fn chat_completion<'a>(
        &'a self,
        credential: &'a Credential,
        query: &'a str,
    ) -> ApiFuture<'a, ApiResult<String>>;

    /// Rebuild the knowledge base.
    ///
    /// # Errors
    /// Returns an error only on transport failure; any HTTP status is an `Ok` reply.
    fn gen_knowledgebase<'a>(
        &'a self,
        credential: &'a Credential,
    ) -> ApiFuture<'a, ApiResult<IngestionReply>>;
}

/// `reqwest` implementation of [`ChatApi`].
#[derive(Clone, Debug)]
pub struct HttpChatApi {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpChatApi {
    /// Create a client for the given configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let client = Self::build_client(&config)?;
        Ok(Self { client, config })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn build_client(config: &ClientConfig) -> ApiResult<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("ai-sre-chat/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| ApiError::HttpClient(e.to_string()))
    }

    /// Query `GET {base}/status`. No credential is needed.
    ///
    /// # Errors
    /// Returns an error if the backend is unreachable or answers badly.
    pub async fn check_status(&self) -> ApiResult<String> {
        let url = self.config.root_url("status")?;
        let response = self
            .client
            .get(url)
            .timeout(self.config.request_timeout)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }
        let bytes = response.bytes().await?;
        let body: StatusResponse = serde_json::from_slice(&bytes)?;
        Ok(body.status)
    }

    async fn fetch_history(&self, credential: &Credential) -> ApiResult<Vec<ConversationTurn>> {
        let url = self.config.api_url("chat-history")?;
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, credential.bearer())
            .timeout(self.config.request_timeout)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }
        let bytes = response.bytes().await?;
        let body: ChatHistoryResponse = serde_json::from_slice(&bytes)?;
        tracing::debug!(turns = body.chat_history.len(), "chat history fetched");
        Ok(body.chat_history)
    }

    async fn post_completion(&self, credential: &Credential, query: &str) -> ApiResult<String> {
        let url = self.config.api_url("chat-completion")?;
        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, credential.bearer())
            .json(&ChatCompletionRequest { query })
            .timeout(self.config.request_timeout)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }
        let bytes = response.bytes().await?;
        let body: ChatCompletionResponse = serde_json::from_slice(&bytes)?;
        Ok(body.chat_completion)
    }

    async fn post_knowledgebase(&self, credential: &Credential) -> ApiResult<IngestionReply> {
        let url = self.config.api_url("gen-knowledgebase")?;
        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, credential.bearer())
            .timeout(self.config.ingestion_timeout)
            .send()
            .await?;
        let http_status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let body = serde_json::from_slice::<KnowledgeBaseResponse>(&bytes).ok();
        if body.is_none() {
            tracing::debug!(http_status, "knowledge base response body was not JSON");
        }
        Ok(IngestionReply { http_status, body })
    }
}

impl ChatApi for HttpChatApi {
    fn chat_history<'a>(
        &'a self,
        credential: &'a Credential,
    ) -> ApiFuture<'a, ApiResult<Vec<ConversationTurn>>> {
        Box::pin(self.fetch_history(credential))
    }

    fn chat_completion<'a>(
        &'a self,
        credential: &'a Credential,
        query: &'a str,
    ) -> ApiFuture<'a, ApiResult<String>> {
        Box::pin(self.post_completion(credential, query))
    }

    fn gen_knowledgebase<'a>(
        &'a self,
        credential: &'a Credential,
    ) -> ApiFuture<'a, ApiResult<IngestionReply>> {
        Box::pin(self.post_knowledgebase(credential))
    }
}
