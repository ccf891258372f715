//! Gateway HTTP server (single port).

use crate::channels::{ChannelHandle, SheetWebhook, TelegramChannel};
use crate::config::{self, Config, OrderConfig};
use crate::gateway::error::OrderError;
use crate::gateway::order::handle_order;
use anyhow::{Context, Result};
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;

/// Shared state for the gateway: resolved order settings and the outbound channels.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<OrderConfig>,
    /// Port the gateway listens on (reported by the health endpoint).
    pub port: u16,
    /// Mandatory notification channel; `None` when the bot token or chat id is missing.
    pub telegram: Option<Arc<dyn ChannelHandle>>,
    /// Present only when a webhook URL is configured.
    pub sheet: Option<Arc<SheetWebhook>>,
}

impl GatewayState {
    /// Build state with channels derived from the order settings. The Telegram channel exists
    /// only when both the bot token and the chat id are set.
    pub fn new(config: OrderConfig, port: u16) -> Self {
        let telegram = match (&config.bot_token, &config.chat_id) {
            (Some(token), Some(_)) => Some(Arc::new(TelegramChannel::new(
                token.clone(),
                config.telegram_api_base.clone(),
            )) as Arc<dyn ChannelHandle>),
            _ => None,
        };
        Self::build(config, port, telegram)
    }

    /// Build state around a caller-supplied notification channel. Orders are still refused
    /// when the chat id is missing.
    pub fn with_channel(config: OrderConfig, port: u16, telegram: Arc<dyn ChannelHandle>) -> Self {
        Self::build(config, port, Some(telegram))
    }

    fn build(config: OrderConfig, port: u16, telegram: Option<Arc<dyn ChannelHandle>>) -> Self {
        let sheet = config.script_url.as_ref().map(|url| {
            Arc::new(SheetWebhook::new(
                url.clone(),
                config.script_secret.clone(),
                config.secret_header.clone(),
            ))
        });
        Self {
            config: Arc::new(config),
            port,
            telegram,
            sheet,
        }
    }
}

/// Routes: `/api/order` (all methods; non-POST answered with 405) and `GET /` health.
/// Panics inside a handler become a plain 500.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(health_http))
        .route("/api/order", any(handle_order))
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "panic".to_string());
    OrderError::Unhandled(detail).into_response()
}

/// Run the gateway server; binds to config.gateway.bind:config.gateway.port.
/// Order settings are resolved once from config and environment. Missing Telegram settings
/// do not stop startup; orders are then refused with 500 until the process is reconfigured.
/// Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_gateway(config: Config) -> Result<()> {
    let order_config = config::resolve_order_config(&config);
    if !order_config.telegram_configured() {
        log::warn!("TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID not set; orders will be refused");
    }
    if order_config.sheet_configured() {
        log::info!("sheet webhook enabled");
    } else {
        log::info!("sheet webhook disabled (GOOGLE_SCRIPT_URL not set)");
    }

    let state = GatewayState::new(order_config, config.gateway.port);
    let app = router(state);

    let bind_addr = format!("{}:{}", config.gateway.bind.trim(), config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// GET / returns a simple health JSON.
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.port,
        "telegram": state.config.telegram_configured(),
        "sheet": state.config.sheet_configured(),
    }))
}
