//! Telegram channel: order notifications via the Bot API sendMessage method.

use crate::channels::handle::{ChannelError, ChannelHandle};
use async_trait::async_trait;
use serde::Serialize;

/// Body of a sendMessage call. Order text is sent as HTML with link previews disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
    pub parse_mode: &'static str,
    pub disable_web_page_preview: bool,
}

impl<'a> SendMessageRequest<'a> {
    pub fn html(chat_id: &'a str, text: &'a str) -> Self {
        Self {
            chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        }
    }
}

/// Telegram channel connector. Holds the bot token and a shared HTTP client.
pub struct TelegramChannel {
    id: String,
    token: String,
    api_base: String,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(token: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            id: "telegram".to_string(),
            token: token.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Send a text message to a chat via sendMessage API. A non-2xx reply is returned as
    /// [`ChannelError::Rejected`] carrying the response body for diagnostics.
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), ChannelError> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let res = self
            .client
            .post(&url)
            .json(&SendMessageRequest::html(chat_id, text))
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ChannelError::Rejected { status, body });
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelHandle for TelegramChannel {
    fn id(&self) -> &str {
        &self.id
    }

    async fn send_message(&self, conversation_id: &str, text: &str) -> Result<(), ChannelError> {
        TelegramChannel::send_message(self, conversation_id, text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_message_body_shape() {
        let body = serde_json::to_value(SendMessageRequest::html("-100", "New order")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "chat_id": "-100",
                "text": "New order",
                "parse_mode": "HTML",
                "disable_web_page_preview": true,
            })
        );
    }

    #[test]
    fn api_base_trailing_slash_is_dropped() {
        let channel = TelegramChannel::new("123:abc", "http://127.0.0.1:9000/");
        assert_eq!(channel.api_base, "http://127.0.0.1:9000");
        assert_eq!(channel.id(), "telegram");
    }
}
