//! Error types for the bot binary.

use rollcall_core::config::ConfigError;
use rollcall_core::{EngineError, TransportError};

/// Errors that stop the bot or abort handling of one update.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// Configuration is missing or invalid.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The engine could not start.
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// Writing a reply failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Reading inbound updates failed.
    #[error("input error: {0}")]
    Io(#[from] std::io::Error),
}
