//! Line-oriented terminal front end.
//!
//! A non-blank input line replaces the pending query and commits it; a blank
//! line commits the pending query as kept after a failure. Slash commands are
//! listed in [`HELP`]. New turns are printed when the scroll anchor reports growth.

use std::io::Write;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

use crate::session::{
    ChatSession, ConversationTurn, IngestionOutcome, Notice, Notifier, RoleType, ScrollAnchor,
    SessionError, SubmitOutcome,
};

/// Command summary printed on start and on `/help`.
pub const HELP: &str = "commands: /ingest  generate knowledge base | /logout  log out and exit | /quit  exit | /help | empty line  retry the kept query";

/// One parsed input line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Start knowledge-base generation.
    Ingest,
    /// Log out and leave.
    Logout,
    /// Leave without logging out.
    Quit,
    /// Show the command list.
    Help,
    /// Blank line: commit the pending query again.
    Retry,
    /// Anything else: the text of the next user turn.
    Query(String),
}

impl Command {
    /// Parse a raw input line (without its line terminator).
    #[must_use]
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "/ingest" => Self::Ingest,
            "/logout" => Self::Logout,
            "/quit" | "/exit" => Self::Quit,
            "/help" => Self::Help,
            "" => Self::Retry,
            _ => Self::Query(line.to_string()),
        }
    }
}

/// Scroll anchor that marks the transcript as needing a redraw.
#[derive(Debug, Default)]
pub struct ConsoleAnchor {
    latest: AtomicUsize,
}

impl ConsoleAnchor {
    /// Length reported by the last growth notification.
    #[must_use]
    pub fn latest(&self) -> usize {
        self.latest.load(Ordering::Acquire)
    }
}

impl ScrollAnchor for ConsoleAnchor {
    fn reveal_latest(&self, len: usize) {
        self.latest.store(len, Ordering::Release);
    }
}

/// Notifier printing a framed message on the terminal.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &Notice) {
        emit(&format!("\n*** {notice} ***"));
    }
}

/// Render one turn with its role prefix.
#[must_use]
pub fn render_turn(turn: &ConversationTurn) -> String {
    let prefix = match turn.role_type() {
        RoleType::Human => "you",
        RoleType::Ai => " ai",
    };
    format!("{prefix}> {}", turn.content())
}

fn emit(text: &str) {
    let mut out = std::io::stdout().lock();
    if let Err(e) = writeln!(out, "{text}").and_then(|()| out.flush()) {
        tracing::debug!("stdout write failed: {e}");
    }
}

/// Terminal loop over an authenticated, hydrated session.
pub struct Console {
    session: Arc<ChatSession>,
    anchor: Arc<ConsoleAnchor>,
    printed: usize,
    ingestion: Option<JoinHandle<()>>,
}

impl Console {
    /// Create a console for `session`, which must report growth to `anchor`.
    #[must_use]
    pub const fn new(session: Arc<ChatSession>, anchor: Arc<ConsoleAnchor>) -> Self {
        Self {
            session,
            anchor,
            printed: 0,
            ingestion: None,
        }
    }

    /// Print turns the anchor reported since the last redraw.
    async fn follow_anchor(&mut self) {
        let latest = self.anchor.latest();
        if latest <= self.printed {
            return;
        }
        for turn in self.session.turns_since(self.printed).await {
            emit(&render_turn(&turn));
        }
        self.printed = latest;
    }

    /// Read stdin until EOF, `/quit` or `/logout`, then wait for a running
    /// knowledge-base generation to finish.
    ///
    /// # Errors
    /// Returns an error if stdin cannot be read.
    pub async fn run(mut self) -> std::io::Result<()> {
        let name = self.session.display_name().await.unwrap_or_default();
        emit(&format!("Hi, {name}. {HELP}"));
        self.follow_anchor().await;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let read = loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if self.handle(Command::parse(&line)).await.is_break() {
                        break Ok(());
                    }
                }
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        self.finish().await;
        read
    }

    /// Apply one command. `Break` means the loop should stop.
    pub async fn handle(&mut self, command: Command) -> ControlFlow<()> {
        match command {
            Command::Help => emit(HELP),
            Command::Quit => return ControlFlow::Break(()),
            Command::Logout => {
                self.session.logout().await;
                emit("logged out");
                return ControlFlow::Break(());
            }
            Command::Ingest => self.start_ingestion().await,
            Command::Retry => self.commit().await,
            Command::Query(text) => {
                self.session.set_pending_query(text).await;
                self.commit().await;
            }
        }
        ControlFlow::Continue(())
    }

    /// Wait for the background ingestion run, if one is still going.
    pub async fn finish(&mut self) {
        let Some(handle) = self.ingestion.take() else {
            return;
        };
        if !handle.is_finished() {
            emit("waiting for knowledge base generation to finish...");
        }
        if let Err(e) = handle.await {
            tracing::debug!("ingestion task ended abnormally: {e}");
        }
    }

    async fn commit(&mut self) {
        match self.session.commit().await {
            Ok(SubmitOutcome::Appended) => self.follow_anchor().await,
            Ok(SubmitOutcome::NotReady) => emit("history is still loading, try again"),
            Ok(SubmitOutcome::AlreadyInFlight) => emit("still waiting for the previous answer"),
            Ok(SubmitOutcome::EmptyQuery | SubmitOutcome::Discarded) => {}
            Err(SessionError::CompletionFailed(err)) => {
                let hint = if err.is_retryable() {
                    "press enter on an empty line to retry"
                } else {
                    "your text was kept, press enter on an empty line to resend it"
                };
                emit(&format!("request failed: {err} ({hint})"));
            }
            Err(err) => emit(&err.to_string()),
        }
    }

    async fn start_ingestion(&mut self) {
        let running = self
            .ingestion
            .as_ref()
            .is_some_and(|handle| !handle.is_finished());
        if running || self.session.is_ingesting().await {
            emit("knowledge base generation is already running");
            return;
        }
        emit("generating knowledge base in the background...");
        let session = Arc::clone(&self.session);
        self.ingestion = Some(tokio::spawn(async move {
            match session.trigger_ingestion().await {
                Ok(IngestionOutcome::Busy) => {
                    emit("knowledge base generation is already running");
                }
                Ok(_) => {}
                Err(err) => emit(&err.to_string()),
            }
        }));
    }
}
