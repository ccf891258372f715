//! Channel trait and error type shared by the notification channels.

use async_trait::async_trait;
use reqwest::StatusCode;

/// Failure of an outbound channel call.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("rejected with {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

/// Handle to a messaging channel that can deliver text to a conversation.
#[async_trait]
pub trait ChannelHandle: Send + Sync {
    /// Channel id (e.g. "telegram").
    fn id(&self) -> &str;
    /// Send a text message to a conversation (e.g. Telegram chat_id).
    async fn send_message(&self, conversation_id: &str, text: &str) -> Result<(), ChannelError>;
}
