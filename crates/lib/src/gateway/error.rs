//! Order handler errors and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Longest body returned for a failed Telegram call in UTF-16 code units, prefix included.
pub const MAX_UPSTREAM_DIAGNOSTIC: usize = 1000;

/// Why an order request was refused. Every variant ends the request.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,
    #[error("Bad Request")]
    MalformedBody,
    #[error("Invalid orderData")]
    InvalidOrderData,
    #[error("Invalid message")]
    InvalidMessage,
    #[error("Server not configured")]
    NotConfigured,
    /// Telegram answered with a non-success status; holds its response body.
    #[error("Telegram failed: {0}")]
    TelegramFailed(String),
    /// Anything unexpected. The detail is logged, never returned.
    #[error("Server error")]
    Unhandled(String),
}

impl OrderError {
    pub fn status(&self) -> StatusCode {
        match self {
            OrderError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            OrderError::MalformedBody => StatusCode::BAD_REQUEST,
            OrderError::InvalidOrderData | OrderError::InvalidMessage => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            OrderError::NotConfigured | OrderError::Unhandled(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            OrderError::TelegramFailed(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Plain-text body sent to the caller.
    pub fn body(&self) -> String {
        let text = self.to_string();
        match self {
            OrderError::TelegramFailed(_) => truncate_utf16(text, MAX_UPSTREAM_DIAGNOSTIC),
            _ => text,
        }
    }
}

/// Cut at the last char boundary that keeps the text within `max` UTF-16 code units.
fn truncate_utf16(mut text: String, max: usize) -> String {
    let mut units = 0;
    let cut = text.char_indices().find_map(|(i, c)| {
        units += c.len_utf16();
        (units > max).then_some(i)
    });
    if let Some(i) = cut {
        text.truncate(i);
    }
    text
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        if let OrderError::Unhandled(ref detail) = self {
            log::error!("order handler failed: {}", detail);
        }
        (self.status(), self.body()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(OrderError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(OrderError::MalformedBody.status(), StatusCode::BAD_REQUEST);
        assert_eq!(OrderError::InvalidOrderData.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(OrderError::InvalidMessage.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(OrderError::NotConfigured.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(OrderError::TelegramFailed(String::new()).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(OrderError::Unhandled("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn telegram_failure_body_is_truncated() {
        let err = OrderError::TelegramFailed("e".repeat(5000));
        let body = err.body();
        assert!(body.starts_with("Telegram failed: eee"));
        assert_eq!(body.chars().count(), MAX_UPSTREAM_DIAGNOSTIC);
    }

    #[test]
    fn telegram_failure_body_counts_utf16_units() {
        // Prefix is 17 units; each emoji is 2, so 491 fit and the 492nd would reach 1001.
        let body = OrderError::TelegramFailed("🍕".repeat(2000)).body();
        assert_eq!(body.encode_utf16().count(), 999);
        assert_eq!(body.chars().count(), 17 + 491);
        assert!(body.ends_with('🍕'));
    }

    #[test]
    fn short_telegram_failure_body_is_untouched() {
        assert_eq!(
            OrderError::TelegramFailed("Bad Request: chat not found".into()).body(),
            "Telegram failed: Bad Request: chat not found"
        );
    }

    #[test]
    fn unhandled_hides_detail() {
        assert_eq!(
            OrderError::Unhandled("connection refused at 10.0.0.1".into()).body(),
            "Server error"
        );
    }
}
