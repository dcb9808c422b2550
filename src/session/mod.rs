//! Chat session core.
//!
//! - `turn`: conversation turn model
//! - `transcript`: append-only transcript
//! - `anchor`: scroll anchor hook fired on transcript growth
//! - `credential`: bearer credential and logout capability
//! - `ingestion`: knowledge-base trigger with its busy flag
//! - `chat`: session state machine tying it all together

pub mod anchor;
pub mod chat;
pub mod credential;
pub mod error;
pub mod ids;
pub mod ingestion;
pub mod transcript;
pub mod turn;

#[cfg(test)]
pub(crate) mod fake_api;

pub use anchor::{GrowthTracker, NoopAnchor, ScrollAnchor};
pub use chat::{ChatSession, ChatSessionBuilder, HydrationOutcome, SessionPhase, SubmitOutcome};
pub use credential::{AuthSession, Credential, LocalAuthSession};
pub use error::{SessionError, SessionResult};
pub use ids::SessionId;
pub use ingestion::{IngestionOutcome, IngestionTrigger, LogNotifier, Notice, Notifier};
pub use transcript::Transcript;
pub use turn::{ConversationTurn, RoleType};
