//! Order submission wire types and the payload validation rules.
//!
//! The inbound body is inspected as loose JSON rather than deserialized into a struct: fields
//! are coerced the way form submitters expect (any value for `company` counts once it has text,
//! `isCutoff` goes by truthiness).

use crate::gateway::error::OrderError;
use serde::Serialize;
use serde_json::{Map, Value};

/// Shortest accepted notification text, in UTF-16 code units.
pub const MIN_MESSAGE_LEN: usize = 10;

/// Outcome of validating an inbound body.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Honeypot field was filled; answer as if accepted, send nothing.
    Spam,
    Order(ValidOrder),
}

/// A submission that passed every check and may be dispatched.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidOrder {
    /// Forwarded verbatim to the spreadsheet webhook.
    pub order_data: Map<String, Value>,
    /// Notification text for Telegram.
    pub msg: String,
    pub is_cutoff: bool,
}

/// Success body: `{ "ok": true }` for filtered spam, `{ "ok": true, "cutoff": .. }` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderAccepted {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cutoff: Option<bool>,
}

impl OrderAccepted {
    pub fn silent() -> Self {
        Self { ok: true, cutoff: None }
    }

    pub fn with_cutoff(cutoff: bool) -> Self {
        Self {
            ok: true,
            cutoff: Some(cutoff),
        }
    }
}

/// Parse and validate a raw request body.
///
/// Checks run in a fixed order and stop at the first failure: JSON object body, honeypot,
/// `orderData`, `msg`. When both `orderData` and `msg` are invalid, the `orderData` error wins.
pub fn validate_submission(body: &[u8]) -> Result<Submission, OrderError> {
    let payload = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => return Err(OrderError::MalformedBody),
    };

    let company = payload.get("company").map(coerce_string).unwrap_or_default();
    if !company.trim().is_empty() {
        return Ok(Submission::Spam);
    }

    let order_data = match payload.get("orderData") {
        Some(Value::Object(data)) => data.clone(),
        _ => return Err(OrderError::InvalidOrderData),
    };

    let msg = payload.get("msg").map(coerce_string).unwrap_or_default();
    if msg.encode_utf16().count() < MIN_MESSAGE_LEN {
        return Err(OrderError::InvalidMessage);
    }

    let is_cutoff = payload.get("isCutoff").map(is_truthy).unwrap_or(false);

    Ok(Submission::Order(ValidOrder {
        order_data,
        msg,
        is_cutoff,
    }))
}

/// Loose string conversion: null is empty, scalars print as text, arrays join their items
/// with commas, objects become `[object Object]`.
pub fn coerce_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => coerce_number(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(coerce_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn coerce_number(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f),
        _ => n.to_string(),
    }
}

/// Truthiness: false, 0, "" and null are false; everything else (including empty arrays
/// and objects) is true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validate(v: Value) -> Result<Submission, OrderError> {
        validate_submission(v.to_string().as_bytes())
    }

    fn order(v: Value) -> ValidOrder {
        match validate(v) {
            Ok(Submission::Order(o)) => o,
            other => panic!("expected order, got {:?}", other),
        }
    }

    #[test]
    fn non_object_bodies_are_malformed() {
        let bodies: [&[u8]; 6] = [b"not json", b"", b"[]", b"\"text\"", b"42", b"null"];
        for body in bodies {
            assert!(matches!(
                validate_submission(body),
                Err(OrderError::MalformedBody)
            ));
        }
    }

    #[test]
    fn filled_honeypot_is_spam_even_when_invalid() {
        assert_eq!(validate(json!({ "company": " Acme " })).unwrap(), Submission::Spam);
        assert_eq!(validate(json!({ "company": 0 })).unwrap(), Submission::Spam);
        assert_eq!(validate(json!({ "company": false })).unwrap(), Submission::Spam);
    }

    #[test]
    fn blank_honeypot_is_ignored() {
        for company in [json!(""), json!("   "), json!(null), json!([])] {
            let o = order(json!({ "company": company, "orderData": {}, "msg": "0123456789" }));
            assert_eq!(o.msg, "0123456789");
        }
    }

    #[test]
    fn order_data_must_be_an_object() {
        for data in [json!(null), json!("x"), json!([1, 2]), json!(3)] {
            assert!(matches!(
                validate(json!({ "orderData": data, "msg": "long enough message" })),
                Err(OrderError::InvalidOrderData)
            ));
        }
        assert!(matches!(
            validate(json!({ "msg": "long enough message" })),
            Err(OrderError::InvalidOrderData)
        ));
    }

    #[test]
    fn order_data_checked_before_msg() {
        assert!(matches!(
            validate(json!({ "msg": "short" })),
            Err(OrderError::InvalidOrderData)
        ));
    }

    #[test]
    fn msg_length_boundary() {
        for len in 0..MIN_MESSAGE_LEN {
            let msg = "x".repeat(len);
            assert!(matches!(
                validate(json!({ "orderData": {}, "msg": msg })),
                Err(OrderError::InvalidMessage)
            ));
        }
        assert_eq!(order(json!({ "orderData": {}, "msg": "x".repeat(10) })).msg.len(), 10);
    }

    #[test]
    fn msg_counts_utf16_units_not_bytes() {
        assert!(matches!(
            validate(json!({ "orderData": {}, "msg": "ééééé" })),
            Err(OrderError::InvalidMessage)
        ));
        assert_eq!(order(json!({ "orderData": {}, "msg": "заказ пицц" })).msg, "заказ пицц");
    }

    #[test]
    fn emoji_count_as_two_units() {
        assert_eq!(order(json!({ "orderData": {}, "msg": "🍕🍕🍕🍕🍕" })).msg, "🍕🍕🍕🍕🍕");
        assert!(matches!(
            validate(json!({ "orderData": {}, "msg": "🍕🍕🍕🍕a" })),
            Err(OrderError::InvalidMessage)
        ));
    }

    #[test]
    fn non_string_msg_is_coerced() {
        assert!(matches!(
            validate(json!({ "orderData": {} })),
            Err(OrderError::InvalidMessage)
        ));
        assert_eq!(order(json!({ "orderData": {}, "msg": 12345678901u64 })).msg, "12345678901");
    }

    #[test]
    fn cutoff_truthiness() {
        let cutoff = |v: Value| order(json!({ "orderData": {}, "msg": "0123456789", "isCutoff": v })).is_cutoff;
        assert!(cutoff(json!(true)));
        assert!(cutoff(json!("yes")));
        assert!(cutoff(json!(1)));
        assert!(cutoff(json!({})));
        assert!(!cutoff(json!(0)));
        assert!(!cutoff(json!(false)));
        assert!(!cutoff(json!("")));
        assert!(!cutoff(json!(null)));
        assert!(!order(json!({ "orderData": {}, "msg": "0123456789" })).is_cutoff);
    }

    #[test]
    fn coerce_string_forms() {
        assert_eq!(coerce_string(&json!(null)), "");
        assert_eq!(coerce_string(&json!(2.0)), "2");
        assert_eq!(coerce_string(&json!(2.5)), "2.5");
        assert_eq!(coerce_string(&json!([1, [2, 3], null])), "1,2,3,");
        assert_eq!(coerce_string(&json!({ "a": 1 })), "[object Object]");
    }

    #[test]
    fn accepted_bodies() {
        assert_eq!(serde_json::to_value(OrderAccepted::silent()).unwrap(), json!({ "ok": true }));
        assert_eq!(
            serde_json::to_value(OrderAccepted::with_cutoff(false)).unwrap(),
            json!({ "ok": true, "cutoff": false })
        );
    }
}
