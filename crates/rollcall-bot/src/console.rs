//! Line-based chat transport.
//!
//! The bot does not own a chat network connection. A companion process
//! relays inbound chat messages to stdin as JSON lines and forwards what
//! the bot writes to stdout:
//!
//! ```text
//! stdin  <- {"user_id": "42", "first_name": "Alice", "text": "/post"}
//! stdout -> {"kind": "message", "chat_id": "-100", "text": "...", "parse_mode": "HTML"}
//! stdout -> {"kind": "reply", "chat_id": "-100", "reply_to": "42", "text": "..."}
//! ```

use rollcall_core::{Transport, TransportError};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// One inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InboundMessage {
    /// Sender's stable id.
    pub user_id: String,
    /// Sender's first name as shown in the chat.
    pub first_name: String,
    /// Message text.
    pub text: String,
}

/// What the relay should do with an outbound line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum OutboundKind {
    /// A post to the destination chat.
    Message,
    /// An answer to a specific user's command.
    Reply,
}

#[derive(Debug, Serialize)]
struct OutboundLine<'a> {
    kind: OutboundKind,
    chat_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
}

/// Writes deliveries and replies as JSON lines.
#[derive(Debug)]
pub struct ConsoleTransport<W> {
    chat_id: String,
    out: Mutex<W>,
}

impl<W: AsyncWrite + Unpin + Send> ConsoleTransport<W> {
    /// Write lines for `chat_id` to `out`.
    pub fn new(chat_id: impl Into<String>, out: W) -> Self {
        Self {
            chat_id: chat_id.into(),
            out: Mutex::new(out),
        }
    }

    /// Answer the user who sent a command. Replies are plain text.
    pub async fn reply(&self, user_id: &str, text: &str) -> Result<(), TransportError> {
        self.write_line(&OutboundLine {
            kind: OutboundKind::Reply,
            chat_id: &self.chat_id,
            reply_to: Some(user_id),
            text,
            parse_mode: None,
        })
        .await
    }

    async fn write_line(&self, line: &OutboundLine<'_>) -> Result<(), TransportError> {
        let mut encoded = serde_json::to_vec(line)?;
        encoded.push(b'\n');
        let mut out = self.out.lock().await;
        out.write_all(&encoded).await?;
        out.flush().await?;
        Ok(())
    }

    /// Run `f` against the underlying writer.
    #[cfg(test)]
    pub async fn with_output<T>(&self, f: impl FnOnce(&W) -> T) -> T {
        f(&*self.out.lock().await)
    }
}

impl<W: AsyncWrite + Unpin + Send> Transport for ConsoleTransport<W> {
    async fn deliver(&self, text: &str, rich_formatting: bool) -> Result<(), TransportError> {
        self.write_line(&OutboundLine {
            kind: OutboundKind::Message,
            chat_id: &self.chat_id,
            reply_to: None,
            text,
            parse_mode: rich_formatting.then_some("HTML"),
        })
        .await
    }
}
