//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.order-intake/config.json`) and environment.
//! Environment values override the file; the result is resolved once into an [`OrderConfig`]
//! that the order handler receives explicitly.

use anyhow::{Context, Result};
use reqwest::header::HeaderName;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_SECRET_HEADER: &str = "x-meatzdymkom-secret";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Gateway server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Notification channel settings (Telegram, spreadsheet webhook).
    #[serde(default)]
    pub channels: ChannelsConfig,
}

/// Gateway bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for HTTP (default 8888).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

fn default_gateway_port() -> u16 {
    8888
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

/// Per-channel config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelsConfig {
    #[serde(default)]
    pub telegram: TelegramChannelConfig,
    #[serde(default)]
    pub sheet: SheetChannelConfig,
}

/// Telegram channel config. Both token and chat id are required to accept orders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramChannelConfig {
    /// Bot token from BotFather. Overridden by TELEGRAM_BOT_TOKEN env when set.
    pub bot_token: Option<String>,
    /// Chat that receives order notifications. Overridden by TELEGRAM_CHAT_ID env when set.
    pub chat_id: Option<String>,
    /// Bot API base URL (default https://api.telegram.org). Overridden by TELEGRAM_API_BASE env.
    pub api_base: Option<String>,
}

/// Spreadsheet webhook (Apps Script) config. When `script_url` is unset, orders are not recorded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetChannelConfig {
    /// Overridden by GOOGLE_SCRIPT_URL env when set.
    pub script_url: Option<String>,
    /// Shared secret sent as a header and a `secret` body field. Overridden by GOOGLE_SCRIPT_SECRET env.
    pub script_secret: Option<String>,
    /// Header carrying the shared secret (default x-meatzdymkom-secret).
    pub secret_header: Option<String>,
}

/// Resolved, immutable settings the order handler runs with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub telegram_api_base: String,
    pub script_url: Option<String>,
    pub script_secret: Option<String>,
    pub secret_header: String,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            telegram_api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
            script_url: None,
            script_secret: None,
            secret_header: DEFAULT_SECRET_HEADER.to_string(),
        }
    }
}

impl OrderConfig {
    /// True when both mandatory Telegram settings are present.
    pub fn telegram_configured(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }

    /// True when the spreadsheet webhook is enabled.
    pub fn sheet_configured(&self) -> bool {
        self.script_url.is_some()
    }

    /// Copy with secrets replaced by a placeholder, for display.
    pub fn redacted(&self) -> Self {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "***".to_string());
        Self {
            bot_token: mask(&self.bot_token),
            script_secret: mask(&self.script_secret),
            ..self.clone()
        }
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|s| !s.is_empty()).cloned()
}

/// Configured secret header, or the default when unset or not a valid header name.
fn resolve_secret_header(configured: Option<&String>) -> String {
    match non_empty(configured) {
        Some(name) if HeaderName::from_bytes(name.as_bytes()).is_ok() => name,
        Some(name) => {
            log::warn!(
                "invalid sheet secretHeader {:?}, using {}",
                name,
                DEFAULT_SECRET_HEADER
            );
            DEFAULT_SECRET_HEADER.to_string()
        }
        None => DEFAULT_SECRET_HEADER.to_string(),
    }
}

/// Resolve the order settings from config and a variable lookup. Lookup values override
/// the file. Values are used as given; only empty strings count as unset.
pub fn resolve_order_config_with<F>(config: &Config, lookup: F) -> OrderConfig
where
    F: Fn(&str) -> Option<String>,
{
    let pick = |key: &str, fallback: Option<&String>| {
        non_empty(lookup(key).as_ref()).or_else(|| non_empty(fallback))
    };
    let telegram = &config.channels.telegram;
    let sheet = &config.channels.sheet;
    OrderConfig {
        bot_token: pick("TELEGRAM_BOT_TOKEN", telegram.bot_token.as_ref()),
        chat_id: pick("TELEGRAM_CHAT_ID", telegram.chat_id.as_ref()),
        telegram_api_base: pick("TELEGRAM_API_BASE", telegram.api_base.as_ref())
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
        script_url: pick("GOOGLE_SCRIPT_URL", sheet.script_url.as_ref()),
        script_secret: pick("GOOGLE_SCRIPT_SECRET", sheet.script_secret.as_ref()),
        secret_header: resolve_secret_header(sheet.secret_header.as_ref()),
    }
}

/// Resolve the order settings from config and the process environment.
pub fn resolve_order_config(config: &Config) -> OrderConfig {
    resolve_order_config_with(config, |key| std::env::var(key).ok())
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("ORDER_INTAKE_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".order-intake").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path (or ORDER_INTAKE_CONFIG_PATH / default). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
