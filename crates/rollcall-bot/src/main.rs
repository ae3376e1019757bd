//! Rollcall chat bot entry point.
//!
//! Reads chat messages as JSON lines on stdin, registers senders as
//! participants, and answers `/post`, `/post_<category>` and `/help`.
//! Posts and replies are written as JSON lines on stdout for a relay
//! process that owns the actual chat connection. Logs go to stderr.
//!
//! # Architecture
//!
//! ```text
//! stdin --> Bot --> Orchestrator --> Engine (rotation, cooldown, state.json)
//!                        |
//!                        +--> ConsoleTransport --> stdout
//! ```

mod bot;
mod commands;
mod console;
mod error;
mod replies;

use std::path::Path;
use std::sync::Arc;

use rollcall_core::{Engine, Orchestrator, RollcallConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::bot::Bot;
use crate::console::ConsoleTransport;
use crate::error::BotError;

/// Configuration file looked up in the working directory.
const CONFIG_FILE: &str = "rollcall-config.yaml";

/// Application entry point.
///
/// Loads configuration, initializes logging, restores engine state, then
/// handles inbound messages until stdin closes.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the catalog cannot be
/// read, or reading stdin fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = RollcallConfig::load(Path::new(CONFIG_FILE))?;

    // Initialize structured logging on stderr; stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("rollcall-bot starting");
    run(&config).await?;
    info!("rollcall-bot stopped");
    Ok(())
}

async fn run(config: &RollcallConfig) -> Result<(), BotError> {
    let chat_id = config.require_chat_id()?.to_owned();
    info!(
        chat_id,
        state_file = %config.storage.state_file.display(),
        messages_dir = %config.storage.messages_dir.display(),
        cooldown_secs = config.rate_limit.cooldown_secs,
        "configuration loaded"
    );

    let engine = Arc::new(Engine::open(config).await?);
    info!(
        categories = engine.catalog().len(),
        templates = engine.catalog().template_count(),
        "message catalog loaded"
    );

    let transport = ConsoleTransport::new(chat_id, tokio::io::stdout());
    let bot = Arc::new(Bot::new(Orchestrator::new(engine, transport)));

    info!("waiting for messages on stdin");
    bot.run(tokio::io::stdin()).await
}
