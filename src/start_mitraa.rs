//! Startup helpers for the Mitraa terminal client.
//!
//! Reads configuration from the environment, connects a session to the
//! backend and relays stdin lines to it until `/quit` or end of input.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::client::HttpChatClient;
use crate::config::ChatConfig;
use crate::session::ConversationSession;
use crate::terminal::{TerminalRenderer, resolve_suggestion};

/// Commands that end the conversation.
const QUIT_COMMANDS: [&str; 2] = ["/quit", "/exit"];

/// Run the terminal client (used by the `mitraa` binary).
///
/// # Returns
/// `ExitCode::SUCCESS` when the user leaves, `1` on startup or I/O failure.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting Mitraa chat client v{}", env!("CARGO_PKG_VERSION"));

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(chat_loop()) {
        tracing::error!("Chat client error: {e:#}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Build a session from the environment and drive it from stdin.
///
/// # Errors
/// Returns an error if configuration, client setup or reading input fails.
pub async fn chat_loop() -> anyhow::Result<()> {
    let config = ChatConfig::from_env().context("Failed to load configuration")?;
    tracing::info!("Chat endpoint: {}/api/chat", config.api_url.trim_end_matches('/'));

    let client = HttpChatClient::new(&config).context("Failed to create chat client")?;
    let renderer = Arc::new(TerminalRenderer::stdout(config.escalation_contacts.clone()));
    let session = ConversationSession::new(config, client, Arc::clone(&renderer))
        .context("Failed to start conversation session")?;

    renderer.greet(session.config());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        renderer.prompt();
        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };

        let input = line.trim();
        if QUIT_COMMANDS.contains(&input) {
            break;
        }

        let message = if session.history().is_empty() {
            resolve_suggestion(input, &session.config().suggested_questions)
                .unwrap_or_else(|| input.to_string())
        } else {
            input.to_string()
        };

        session.submit(&message).await;
    }

    session.close();
    Ok(())
}
