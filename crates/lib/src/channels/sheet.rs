//! Spreadsheet channel: forwards order data to an Apps Script webhook.

use crate::channels::handle::ChannelError;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Webhook that records orders in a spreadsheet. Best effort: callers dispatch and move on.
pub struct SheetWebhook {
    url: String,
    secret: Option<String>,
    secret_header: String,
    client: reqwest::Client,
}

impl SheetWebhook {
    pub fn new(url: impl Into<String>, secret: Option<String>, secret_header: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            secret,
            secret_header: secret_header.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Order data as sent to the webhook; the secret, when set, is merged in as `secret`.
    pub fn record_body(&self, order_data: &Map<String, Value>) -> Value {
        let mut record = order_data.clone();
        if let Some(ref secret) = self.secret {
            record.insert("secret".to_string(), Value::String(secret.clone()));
        }
        Value::Object(record)
    }

    /// POST the order data to the webhook.
    pub async fn forward(&self, order_data: &Map<String, Value>) -> Result<(), ChannelError> {
        let mut req = self.client.post(&self.url).json(&self.record_body(order_data));
        if let Some(ref secret) = self.secret {
            req = req.header(self.secret_header.as_str(), secret.as_str());
        }
        let res = req.send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ChannelError::Rejected { status, body });
        }
        Ok(())
    }

    /// Forward on a detached task. Errors are logged and dropped; the handle may be ignored.
    pub fn dispatch(self: Arc<Self>, order_data: Map<String, Value>) -> JoinHandle<()> {
        tokio::spawn(async move {
            match self.forward(&order_data).await {
                Ok(()) => log::debug!("sheet webhook: order recorded"),
                Err(e) => log::debug!("sheet webhook failed (ignored): {}", e),
            }
        })
    }
}
