//! The outbound chat seam.
//!
//! The engine never talks to a chat network. It hands composed text to a
//! [`Transport`], which may be a real chat API, the console transport in
//! the bot binary, or a recording stub in tests.

use std::future::Future;

/// Errors a transport can report when delivering a message.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Writing to the underlying channel failed.
    #[error("delivery I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// The message could not be encoded for the channel.
    #[error("failed to encode outbound message: {0}")]
    Encode(#[from] serde_json::Error),

    /// The remote side refused the message.
    #[error("delivery rejected: {message}")]
    Rejected {
        /// Reason given by the remote side.
        message: String,
    },
}

/// Delivers composed text to the configured destination chat.
pub trait Transport: Send + Sync {
    /// Send `text` to the destination chat.
    ///
    /// When `rich_formatting` is set the text carries HTML markup
    /// (participant mentions) and must be sent with HTML parsing enabled.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the message was not delivered.
    fn deliver(
        &self,
        text: &str,
        rich_formatting: bool,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}
