//! Order intake library: configuration, notification channels, and the HTTP gateway
//! that validates order submissions and forwards them to Telegram and a spreadsheet webhook.

pub mod channels;
pub mod config;
pub mod gateway;
