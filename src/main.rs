//! Binary entrypoint for the terminal chat client.

use std::process::ExitCode;

use ai_sre_chat::start_chat_client;

/// Read the credential from the environment, load history and start chatting.
fn main() -> ExitCode {
    start_chat_client::run()
}
