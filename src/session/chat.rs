//! Chat session lifecycle: credential gating, history hydration, the
//! completion request cycle and logout.
//!
//! Phases:
//! - `Unauthenticated`: no credential; nothing is sent.
//! - `HistoryLoading`: credential present, the single history fetch is in flight.
//! - `Active`: history resolved (possibly empty); queries are accepted.
//!
//! Every mount gets a new epoch. A request that resolves after its epoch ended
//! (logout, credential swap) is dropped instead of touching the new state.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tokio::sync::RwLock;

use crate::api::client::ChatApi;
use crate::session::anchor::{GrowthTracker, NoopAnchor, ScrollAnchor};
use crate::session::credential::{AuthSession, Credential, LocalAuthSession};
use crate::session::error::{SessionError, SessionResult};
use crate::session::ids::SessionId;
use crate::session::ingestion::{FlagGuard, IngestionOutcome, IngestionTrigger, LogNotifier, Notifier};
use crate::session::transcript::Transcript;
use crate::session::turn::ConversationTurn;

/// Lifecycle phase of a session.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionPhase {
    /// No credential.
    Unauthenticated,
    /// History fetch in flight.
    HistoryLoading,
    /// Transcript is interactive.
    Active,
}

/// Result of reporting the current credential to the session.
#[derive(Debug)]
pub enum HydrationOutcome {
    /// History was loaded and seeded.
    Loaded {
        /// Number of turns received.
        turns: usize,
    },
    /// History failed; the session is active with an empty transcript.
    Unavailable(SessionError),
    /// Same credential as before; nothing happened.
    Unchanged,
    /// No credential; the user must authenticate.
    NoCredential,
    /// The session was torn down while the fetch was in flight.
    Discarded,
}

/// Result of submitting a query.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitOutcome {
    /// The exchange was appended and the pending query cleared.
    Appended,
    /// The query was blank; nothing was sent.
    EmptyQuery,
    /// Another submission is in flight; nothing was sent.
    AlreadyInFlight,
    /// History is still loading; nothing was sent.
    NotReady,
    /// The session ended before the reply arrived; the reply was dropped.
    Discarded,
}

struct SessionState {
    id: SessionId,
    phase: SessionPhase,
    credential: Option<Credential>,
    epoch: u64,
    transcript: Transcript,
    pending_query: String,
    growth: GrowthTracker,
    // Busy flags belong to one mount; requests left over from an ended mount
    // keep their own copy and cannot block the next one.
    submitting: Arc<AtomicBool>,
    ingestion: Arc<IngestionTrigger>,
    notifier: Arc<dyn Notifier>,
}

impl SessionState {
    fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            id: SessionId::new(),
            phase: SessionPhase::Unauthenticated,
            credential: None,
            epoch: 0,
            transcript: Transcript::new(),
            pending_query: String::new(),
            growth: GrowthTracker::new(),
            submitting: Arc::new(AtomicBool::new(false)),
            ingestion: Arc::new(IngestionTrigger::new(Arc::clone(&notifier))),
            notifier,
        }
    }

    fn mount(&mut self, credential: Credential) -> (u64, Credential) {
        self.epoch += 1;
        self.id = SessionId::new();
        self.phase = SessionPhase::HistoryLoading;
        self.credential = Some(credential.clone());
        tracing::debug!(session = %self.id, "history loading");
        (self.epoch, credential)
    }

    fn tear_down(&mut self) {
        tracing::debug!(session = %self.id, "session torn down");
        self.epoch += 1;
        self.phase = SessionPhase::Unauthenticated;
        self.credential = None;
        self.transcript = Transcript::new();
        self.pending_query.clear();
        self.growth.reset();
        self.submitting = Arc::new(AtomicBool::new(false));
        self.ingestion = Arc::new(IngestionTrigger::new(Arc::clone(&self.notifier)));
    }

    fn observe_growth(&mut self) -> Option<usize> {
        self.growth.observe(self.transcript.len())
    }
}

/// Builder for [`ChatSession`].
pub struct ChatSessionBuilder {
    api: Arc<dyn ChatApi>,
    auth: Arc<dyn AuthSession>,
    anchor: Arc<dyn ScrollAnchor>,
    notifier: Arc<dyn Notifier>,
}

impl ChatSessionBuilder {
    /// Set the logout action.
    #[must_use]
    pub fn auth(mut self, auth: Arc<dyn AuthSession>) -> Self {
        self.auth = auth;
        self
    }

    /// Set the scroll anchor notified on transcript growth.
    #[must_use]
    pub fn anchor(mut self, anchor: Arc<dyn ScrollAnchor>) -> Self {
        self.anchor = anchor;
        self
    }

    /// Set the notifier used for ingestion results.
    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Build an unauthenticated session.
    #[must_use]
    pub fn build(self) -> ChatSession {
        ChatSession {
            api: self.api,
            auth: self.auth,
            anchor: self.anchor,
            state: RwLock::new(SessionState::new(self.notifier)),
        }
    }
}

/// A chat session bound to one backend.
pub struct ChatSession {
    api: Arc<dyn ChatApi>,
    auth: Arc<dyn AuthSession>,
    anchor: Arc<dyn ScrollAnchor>,
    state: RwLock<SessionState>,
}

impl ChatSession {
    /// Start building a session over `api`.
    #[must_use]
    pub fn builder(api: Arc<dyn ChatApi>) -> ChatSessionBuilder {
        ChatSessionBuilder {
            api,
            auth: Arc::new(LocalAuthSession),
            anchor: Arc::new(NoopAnchor),
            notifier: Arc::new(LogNotifier),
        }
    }

    /// Report the credential currently held by the auth layer.
    ///
    /// Call this whenever the auth layer may have changed. History is fetched
    /// once per transition from no credential to a credential; repeating the
    /// same credential is a no-op.
    pub async fn sync_credential(&self, credential: Option<Credential>) -> HydrationOutcome {
        let (epoch, credential) = {
            let mut state = self.state.write().await;
            let current = state.credential.clone();
            match (current, credential) {
                (None, None) => return HydrationOutcome::NoCredential,
                (Some(current), Some(next)) if current == next => {
                    return HydrationOutcome::Unchanged;
                }
                (Some(_), None) => {
                    state.tear_down();
                    return HydrationOutcome::NoCredential;
                }
                (Some(_), Some(next)) => {
                    // A different user is treated as a fresh mount.
                    state.tear_down();
                    state.mount(next)
                }
                (None, Some(next)) => state.mount(next),
            }
        };

        let result = self.api.chat_history(&credential).await;

        let mut state = self.state.write().await;
        if state.epoch != epoch {
            tracing::debug!("history arrived after session ended, dropped");
            return HydrationOutcome::Discarded;
        }
        let outcome = match result {
            Ok(turns) => {
                let count = turns.len();
                state.transcript.seed(turns);
                tracing::info!(session = %state.id, turns = count, "chat history loaded");
                HydrationOutcome::Loaded { turns: count }
            }
            Err(err) => {
                state.transcript.seed(Vec::new());
                let err = SessionError::HistoryUnavailable(err);
                tracing::warn!(session = %state.id, "{err}; starting with an empty transcript");
                HydrationOutcome::Unavailable(err)
            }
        };
        state.phase = SessionPhase::Active;
        let grown = state.observe_growth();
        drop(state);

        if let Some(len) = grown {
            self.anchor.reveal_latest(len);
        }
        outcome
    }

    /// Submit the pending query, as on an "accept" key press.
    ///
    /// # Errors
    /// See [`ChatSession::submit_query`].
    pub async fn commit(&self) -> SessionResult<SubmitOutcome> {
        let query = self.pending_query().await;
        self.submit_query(&query).await
    }

    /// Send `query` to the completion service and append the exchange.
    ///
    /// The query is sent exactly as given; only the emptiness check trims it.
    /// On success the transcript gains the human turn then the ai turn, and
    /// the pending query is cleared. On failure nothing changes.
    ///
    /// # Errors
    /// Returns `AuthMissing` without a credential and `CompletionFailed` when
    /// the request fails.
    pub async fn submit_query(&self, query: &str) -> SessionResult<SubmitOutcome> {
        if query.trim().is_empty() {
            return Ok(SubmitOutcome::EmptyQuery);
        }

        let (epoch, credential, id, submitting) = {
            let state = self.state.read().await;
            match state.phase {
                SessionPhase::Unauthenticated => return Err(SessionError::AuthMissing),
                SessionPhase::HistoryLoading => return Ok(SubmitOutcome::NotReady),
                SessionPhase::Active => {}
            }
            let credential = state.credential.clone().ok_or(SessionError::AuthMissing)?;
            (state.epoch, credential, state.id, Arc::clone(&state.submitting))
        };

        let Some(_in_flight) = FlagGuard::acquire(&submitting) else {
            tracing::debug!(session = %id, "submission already in flight, commit ignored");
            return Ok(SubmitOutcome::AlreadyInFlight);
        };

        tracing::debug!(session = %id, query_len = query.len(), "chat completion requested");
        let reply = match self.api.chat_completion(&credential, query).await {
            Ok(reply) => reply,
            Err(err) => {
                let err = SessionError::CompletionFailed(err);
                tracing::warn!(session = %id, "{err}");
                return Err(err);
            }
        };

        let mut state = self.state.write().await;
        if state.epoch != epoch {
            tracing::debug!(session = %id, "completion arrived after session ended, dropped");
            return Ok(SubmitOutcome::Discarded);
        }
        let reply_len = reply.len();
        state.transcript.append_exchange(query, reply);
        state.pending_query.clear();
        let grown = state.observe_growth();
        drop(state);

        tracing::info!(session = %id, reply_len, "chat completion appended");
        if let Some(len) = grown {
            self.anchor.reveal_latest(len);
        }
        Ok(SubmitOutcome::Appended)
    }

    /// Rebuild the backend knowledge base. Ignored while a run is in flight.
    ///
    /// # Errors
    /// Returns `AuthMissing` without a credential.
    pub async fn trigger_ingestion(&self) -> SessionResult<IngestionOutcome> {
        let (credential, ingestion) = {
            let state = self.state.read().await;
            let credential = state.credential.clone().ok_or(SessionError::AuthMissing)?;
            (credential, Arc::clone(&state.ingestion))
        };
        Ok(ingestion.trigger(self.api.as_ref(), &credential).await)
    }

    /// Leave the session: drop transcript, pending query and credential, then
    /// call the auth layer's logout. Returns `false` if already logged out.
    pub async fn logout(&self) -> bool {
        let mut state = self.state.write().await;
        if state.phase == SessionPhase::Unauthenticated {
            return false;
        }
        state.tear_down();
        drop(state);
        self.auth.logout();
        true
    }

    /// Replace the text of the next user turn.
    pub async fn set_pending_query(&self, text: impl Into<String>) {
        self.state.write().await.pending_query = text.into();
    }

    /// Current text of the next user turn.
    pub async fn pending_query(&self) -> String {
        self.state.read().await.pending_query.clone()
    }

    /// Snapshot of the transcript.
    pub async fn transcript(&self) -> Vec<ConversationTurn> {
        self.state.read().await.transcript.turns().to_vec()
    }

    /// Turns from index `from` onward.
    pub async fn turns_since(&self, from: usize) -> Vec<ConversationTurn> {
        self.state
            .read()
            .await
            .transcript
            .turns()
            .get(from..)
            .map(<[_]>::to_vec)
            .unwrap_or_default()
    }

    /// Current lifecycle phase.
    pub async fn phase(&self) -> SessionPhase {
        self.state.read().await.phase
    }

    /// Identifier of the current mount.
    pub async fn id(&self) -> SessionId {
        self.state.read().await.id
    }

    /// Display name of the authenticated user, if any.
    pub async fn display_name(&self) -> Option<String> {
        self.state
            .read()
            .await
            .credential
            .as_ref()
            .map(|credential| credential.display_name().to_string())
    }

    /// Whether an ingestion run started in the current mount is in flight.
    pub async fn is_ingesting(&self) -> bool {
        self.state.read().await.ingestion.is_busy()
    }
}
