//! In-process backend double for session tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

use crate::api::client::{ApiFuture, ChatApi};
use crate::api::error::{ApiError, ApiResult};
use crate::api::types::{IngestionReply, KnowledgeBaseResponse};
use crate::session::anchor::ScrollAnchor;
use crate::session::credential::{AuthSession, Credential};
use crate::session::ingestion::{Notice, Notifier};
use crate::session::turn::ConversationTurn;

enum Scripted<T> {
    Ok(T),
    Status(u16),
    Transport(String),
}

impl<T: Clone> Scripted<T> {
    fn to_result(&self) -> ApiResult<T> {
        match self {
            Self::Ok(value) => Ok(value.clone()),
            Self::Status(code) => Err(ApiError::Status(*code)),
            Self::Transport(message) => Err(ApiError::HttpClient(message.clone())),
        }
    }
}

pub struct FakeApi {
    history: Scripted<Vec<ConversationTurn>>,
    completion: Mutex<Scripted<String>>,
    ingestion: Scripted<IngestionReply>,
    history_calls: AtomicUsize,
    completion_calls: AtomicUsize,
    ingestion_calls: AtomicUsize,
    seen_tokens: Mutex<Vec<String>>,
    seen_queries: Mutex<Vec<String>>,
    history_gate: Option<Notify>,
    completion_gate: Option<Notify>,
    ingestion_gate: Option<Notify>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            history: Scripted::Ok(Vec::new()),
            completion: Mutex::new(Scripted::Ok(String::new())),
            ingestion: Scripted::Ok(IngestionReply {
                http_status: 200,
                body: None,
            }),
            history_calls: AtomicUsize::new(0),
            completion_calls: AtomicUsize::new(0),
            ingestion_calls: AtomicUsize::new(0),
            seen_tokens: Mutex::new(Vec::new()),
            seen_queries: Mutex::new(Vec::new()),
            history_gate: None,
            completion_gate: None,
            ingestion_gate: None,
        }
    }

    pub fn with_history(mut self, turns: Vec<ConversationTurn>) -> Self {
        self.history = Scripted::Ok(turns);
        self
    }

    pub fn with_history_status(mut self, code: u16) -> Self {
        self.history = Scripted::Status(code);
        self
    }

    pub fn with_history_gate(mut self) -> Self {
        self.history_gate = Some(Notify::new());
        self
    }

    pub fn with_completion(self, reply: &str) -> Self {
        self.set_completion(reply);
        self
    }

    pub fn with_completion_status(self, code: u16) -> Self {
        *self.completion.lock().unwrap() = Scripted::Status(code);
        self
    }

    pub fn with_completion_gate(mut self) -> Self {
        self.completion_gate = Some(Notify::new());
        self
    }

    pub fn set_completion(&self, reply: &str) {
        *self.completion.lock().unwrap() = Scripted::Ok(reply.to_string());
    }

    pub fn with_ingestion_reply(mut self, http_status: u16, body: Option<(&str, Option<&str>)>) -> Self {
        self.ingestion = Scripted::Ok(IngestionReply {
            http_status,
            body: body.map(|(status, error)| KnowledgeBaseResponse {
                status: status.to_string(),
                error: error.map(str::to_string),
            }),
        });
        self
    }

    pub fn with_ingestion_transport_error(mut self, message: &str) -> Self {
        self.ingestion = Scripted::Transport(message.to_string());
        self
    }

    pub fn with_ingestion_gate(mut self) -> Self {
        self.ingestion_gate = Some(Notify::new());
        self
    }

    pub fn release_history(&self) {
        if let Some(gate) = &self.history_gate {
            gate.notify_one();
        }
    }

    pub fn release_completion(&self) {
        if let Some(gate) = &self.completion_gate {
            gate.notify_one();
        }
    }

    pub fn release_ingestion(&self) {
        if let Some(gate) = &self.ingestion_gate {
            gate.notify_one();
        }
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    pub fn completion_calls(&self) -> usize {
        self.completion_calls.load(Ordering::SeqCst)
    }

    pub fn ingestion_calls(&self) -> usize {
        self.ingestion_calls.load(Ordering::SeqCst)
    }

    pub fn seen_tokens(&self) -> Vec<String> {
        self.seen_tokens.lock().unwrap().clone()
    }

    pub fn seen_queries(&self) -> Vec<String> {
        self.seen_queries.lock().unwrap().clone()
    }

    fn record_token(&self, credential: &Credential) {
        self.seen_tokens.lock().unwrap().push(credential.token().to_string());
    }
}

async fn pass(gate: Option<&Notify>) {
    if let Some(gate) = gate {
        gate.notified().await;
    }
}

impl ChatApi for FakeApi {
    fn chat_history<'a>(
        &'a self,
        credential: &'a Credential,
    ) -> ApiFuture<'a, ApiResult<Vec<ConversationTurn>>> {
        Box::pin(async move {
            self.history_calls.fetch_add(1, Ordering::SeqCst);
            self.record_token(credential);
            pass(self.history_gate.as_ref()).await;
            self.history.to_result()
        })
    }

    fn chat_completion<'a>(
        &'a self,
        credential: &'a Credential,
        query: &'a str,
    ) -> ApiFuture<'a, ApiResult<String>> {
        Box::pin(async move {
            self.completion_calls.fetch_add(1, Ordering::SeqCst);
            self.record_token(credential);
            self.seen_queries.lock().unwrap().push(query.to_string());
            pass(self.completion_gate.as_ref()).await;
            self.completion.lock().unwrap().to_result()
        })
    }

    fn gen_knowledgebase<'a>(
        &'a self,
        credential: &'a Credential,
    ) -> ApiFuture<'a, ApiResult<IngestionReply>> {
        Box::pin(async move {
            self.ingestion_calls.fetch_add(1, Ordering::SeqCst);
            self.record_token(credential);
            pass(self.ingestion_gate.as_ref()).await;
            self.ingestion.to_result()
        })
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        self.messages.lock().unwrap().push(notice.to_string());
    }
}

#[derive(Default)]
pub struct RecordingAnchor {
    reveals: Mutex<Vec<usize>>,
}

impl RecordingAnchor {
    pub fn reveals(&self) -> Vec<usize> {
        self.reveals.lock().unwrap().clone()
    }
}

impl ScrollAnchor for RecordingAnchor {
    fn reveal_latest(&self, len: usize) {
        self.reveals.lock().unwrap().push(len);
    }
}

#[derive(Default)]
pub struct CountingAuth {
    logouts: AtomicUsize,
}

impl CountingAuth {
    pub fn logouts(&self) -> usize {
        self.logouts.load(Ordering::SeqCst)
    }
}

impl AuthSession for CountingAuth {
    fn logout(&self) {
        self.logouts.fetch_add(1, Ordering::SeqCst);
    }
}
