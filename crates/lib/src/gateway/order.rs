//! `/api/order` handler: validate, notify Telegram, hand the order to the spreadsheet webhook.

use crate::channels::{ChannelError, ChannelHandle};
use crate::gateway::error::OrderError;
use crate::gateway::protocol::{validate_submission, OrderAccepted, Submission};
use crate::gateway::server::GatewayState;
use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

/// Any method is routed here so that non-POST requests get the handler's own 405 body.
pub async fn handle_order(
    State(state): State<GatewayState>,
    method: Method,
    body: Bytes,
) -> Response {
    match process_order(&state, &method, &body).await {
        Ok(accepted) => (StatusCode::OK, Json(accepted)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Run one submission through validation, the configuration gate and dispatch.
pub async fn process_order(
    state: &GatewayState,
    method: &Method,
    body: &[u8],
) -> Result<OrderAccepted, OrderError> {
    if *method != Method::POST {
        return Err(OrderError::MethodNotAllowed);
    }

    let order = match validate_submission(body)? {
        Submission::Spam => {
            log::info!("order: honeypot filled, submission dropped");
            return Ok(OrderAccepted::silent());
        }
        Submission::Order(order) => order,
    };

    let (telegram, chat_id) = match (&state.telegram, &state.config.chat_id) {
        (Some(telegram), Some(chat_id)) => (&**telegram, chat_id.as_str()),
        _ => {
            log::error!("order: telegram bot token or chat id not configured");
            return Err(OrderError::NotConfigured);
        }
    };

    send_notification(telegram, chat_id, &order.msg).await?;

    if let Some(ref sheet) = state.sheet {
        let _ = sheet.clone().dispatch(order.order_data);
    }

    Ok(OrderAccepted::with_cutoff(order.is_cutoff))
}

async fn send_notification(
    channel: &dyn ChannelHandle,
    chat_id: &str,
    text: &str,
) -> Result<(), OrderError> {
    match channel.send_message(chat_id, text).await {
        Ok(()) => Ok(()),
        Err(ChannelError::Rejected { status, body }) => {
            log::warn!("order: {} rejected notification with {}", channel.id(), status);
            Err(OrderError::TelegramFailed(body))
        }
        Err(e) => Err(OrderError::Unhandled(format!("{}: {}", channel.id(), e))),
    }
}
