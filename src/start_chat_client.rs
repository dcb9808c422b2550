//! Startup helpers for the terminal chat client.

use std::process::ExitCode;
use std::sync::Arc;

use crate::api::client::{ChatApi, HttpChatApi};
use crate::config::ClientConfig;
use crate::console::{Console, ConsoleAnchor, ConsoleNotifier};
use crate::session::{ChatSession, Credential, HydrationOutcome, ScrollAnchor, SessionError};

/// Environment variable holding the bearer token.
pub const TOKEN_ENV: &str = "AI_SRE_TOKEN";
/// Environment variable holding the display name.
pub const USER_ENV: &str = "AI_SRE_USER";

/// Install the tracing subscriber. Logs go to stderr, `warn` unless `RUST_LOG` says otherwise.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Credential from `AI_SRE_TOKEN` / `AI_SRE_USER`; `None` when the token is empty or unset.
#[must_use]
pub fn credential_from_env() -> Option<Credential> {
    let token = std::env::var(TOKEN_ENV).unwrap_or_default();
    let user = std::env::var(USER_ENV).unwrap_or_else(|_| "user".to_string());
    Credential::new(token, user)
}

/// Run the terminal client until the user quits.
///
/// # Returns
/// `ExitCode::SUCCESS` on a normal exit, `1` on bootstrap failure or missing credential.
#[must_use]
pub fn run() -> ExitCode {
    init_tracing();
    tracing::info!("Starting ai-sre-chat v{}", env!("CARGO_PKG_VERSION"));

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::from(1);
        }
    };
    tracing::info!("Backend endpoint: {}", config.base_url);

    let Some(credential) = credential_from_env() else {
        tracing::error!("{}: set {TOKEN_ENV} to a bearer token", SessionError::AuthMissing);
        return ExitCode::from(1);
    };

    let api = match HttpChatApi::new(config) {
        Ok(api) => Arc::new(api),
        Err(e) => {
            tracing::error!("Failed to create HTTP client: {e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(run_session(api, credential)) {
        tracing::error!("Console error: {e}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Check the backend, hydrate a session and hand it to the console.
///
/// # Errors
/// Returns an error if stdin cannot be read.
pub async fn run_session(api: Arc<HttpChatApi>, credential: Credential) -> std::io::Result<()> {
    match api.check_status().await {
        Ok(status) => tracing::info!("Backend status: {status}"),
        Err(e) => tracing::warn!("Backend status check failed: {e}"),
    }

    let anchor = Arc::new(ConsoleAnchor::default());
    let session = Arc::new(
        ChatSession::builder(api as Arc<dyn ChatApi>)
            .anchor(Arc::clone(&anchor) as Arc<dyn ScrollAnchor>)
            .notifier(Arc::new(ConsoleNotifier))
            .build(),
    );

    if let HydrationOutcome::Unavailable(err) = session.sync_credential(Some(credential)).await {
        tracing::debug!("continuing without history: {err}");
    }

    Console::new(session, anchor).run().await
}
