//! Inbound message dispatch.
//!
//! Every inbound line is handled on its own task. Commands go through the
//! [`Orchestrator`]; plain text registers the sender as a participant.

use std::sync::Arc;

use rollcall_core::{EngineError, Orchestrator, OrchestratorError, ParticipantId};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, BufReader};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::commands::{Command, help_text, mention_label};
use crate::console::{ConsoleTransport, InboundMessage};
use crate::error::BotError;
use crate::replies;

/// The chat bot: engine, transport, and command handling.
#[derive(Debug)]
pub struct Bot<W> {
    orchestrator: Orchestrator<ConsoleTransport<W>>,
}

impl<W> Bot<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    /// Create a bot around an orchestrator.
    pub const fn new(orchestrator: Orchestrator<ConsoleTransport<W>>) -> Self {
        Self { orchestrator }
    }

    /// Read JSON-line messages from `input` until it closes.
    ///
    /// Malformed lines are logged and skipped. Returns once every
    /// in-flight message has been handled.
    pub async fn run<R>(self: &Arc<Self>, input: R) -> Result<(), BotError>
    where
        R: AsyncRead + Unpin,
    {
        let mut lines = BufReader::new(input).lines();
        let mut tasks = JoinSet::new();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let message: InboundMessage = match serde_json::from_str(&line) {
                Ok(message) => message,
                Err(e) => {
                    warn!(error = %e, "skipping malformed inbound line");
                    continue;
                }
            };

            let bot = Arc::clone(self);
            tasks.spawn(async move {
                if let Err(e) = bot.handle(message).await {
                    error!(error = %e, "failed to handle message");
                }
            });
            while tasks.try_join_next().is_some() {}
        }

        info!(pending = tasks.len(), "input closed, draining in-flight messages");
        while tasks.join_next().await.is_some() {}
        Ok(())
    }

    /// Handle one inbound message.
    pub async fn handle(&self, message: InboundMessage) -> Result<(), BotError> {
        let Some(command) = Command::parse(&message.text) else {
            let label = mention_label(&message.user_id, &message.first_name);
            let id = ParticipantId::new(message.user_id);
            self.orchestrator.engine().observe_identity(&id, &label).await;
            return Ok(());
        };

        info!(user = %message.user_id, ?command, "command received");
        let reply = match command {
            Command::Post { category } => {
                match self.orchestrator.post(category.as_deref()).await {
                    Ok(emission) => {
                        debug!(category = %emission.category, "post completed");
                        None
                    }
                    Err(err) => Some(failure_reply(&err)),
                }
            }
            Command::Help => Some(help_text(&self.orchestrator.engine().list_categories())),
            Command::Unknown { name } => {
                warn!(command = %name, "unknown command");
                Some(replies::unknown_command(&name))
            }
        };

        if let Some(text) = reply {
            self.orchestrator
                .transport()
                .reply(&message.user_id, &text)
                .await?;
        }
        Ok(())
    }
}

fn failure_reply(err: &OrchestratorError) -> String {
    if matches!(err, OrchestratorError::Engine(EngineError::RateLimited { .. })) {
        info!(error = %err, "post refused");
    } else {
        warn!(error = %err, "post failed");
    }
    replies::error_reply(err, &mut rand::rng())
}
