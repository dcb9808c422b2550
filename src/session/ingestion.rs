//! Knowledge-base ingestion trigger.
//!
//! At most one run is in flight. The busy flag is raised before the request
//! and lowered when it resolves, whatever the result.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::api::client::ChatApi;
use crate::session::credential::Credential;
use crate::session::error::SessionError;

/// User-visible message produced when a run finishes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Notice {
    /// The backend rebuilt the knowledge base.
    IngestionSucceeded,
    /// The run failed.
    IngestionFailed {
        /// Best available failure detail.
        detail: String,
    },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IngestionSucceeded => write!(f, "Knowledge base generated successfully"),
            Self::IngestionFailed { detail } => {
                write!(f, "Knowledge base generation failed:\n {detail}")
            }
        }
    }
}

/// Sink for blocking user notifications.
pub trait Notifier: Send + Sync {
    /// Show `notice` to the user.
    fn notify(&self, notice: &Notice);
}

/// Notifier that only writes to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: &Notice) {
        match notice {
            Notice::IngestionSucceeded => tracing::info!("{notice}"),
            Notice::IngestionFailed { .. } => tracing::warn!("{notice}"),
        }
    }
}

/// Result of one trigger.
#[derive(Debug)]
pub enum IngestionOutcome {
    /// The run finished and the backend reported success.
    Succeeded,
    /// The run finished with a failure.
    Failed(SessionError),
    /// A run was already in flight; nothing was sent.
    Busy,
}

impl IngestionOutcome {
    /// Whether a request was actually issued.
    #[must_use]
    pub const fn was_started(&self) -> bool {
        !matches!(self, Self::Busy)
    }
}

/// Lowers a flag when dropped.
pub(crate) struct FlagGuard<'a>(&'a AtomicBool);

impl<'a> FlagGuard<'a> {
    /// Raise `flag`; returns `None` if it was already raised.
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Mutually exclusive knowledge-base trigger with a busy flag.
pub struct IngestionTrigger {
    busy: AtomicBool,
    notifier: Arc<dyn Notifier>,
}

impl IngestionTrigger {
    /// Create an idle trigger reporting to `notifier`.
    #[must_use]
    pub const fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            busy: AtomicBool::new(false),
            notifier,
        }
    }

    /// Whether a run is in flight. Front ends disable the control while true.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Start a run unless one is already in flight.
    pub async fn trigger(&self, api: &dyn ChatApi, credential: &Credential) -> IngestionOutcome {
        let Some(guard) = FlagGuard::acquire(&self.busy) else {
            tracing::debug!("knowledge base generation already running, trigger ignored");
            return IngestionOutcome::Busy;
        };

        tracing::info!("knowledge base generation started");
        let result = api.gen_knowledgebase(credential).await;
        drop(guard);

        let notice = match result {
            Ok(reply) if reply.is_success() => Notice::IngestionSucceeded,
            Ok(reply) => Notice::IngestionFailed {
                detail: reply.failure_detail(),
            },
            Err(err) => Notice::IngestionFailed {
                detail: err.to_string(),
            },
        };
        self.notifier.notify(&notice);

        match notice {
            Notice::IngestionSucceeded => {
                tracing::info!("knowledge base generation finished");
                IngestionOutcome::Succeeded
            }
            Notice::IngestionFailed { detail } => {
                tracing::warn!(%detail, "knowledge base generation failed");
                IngestionOutcome::Failed(SessionError::IngestionFailed { detail })
            }
        }
    }
}
