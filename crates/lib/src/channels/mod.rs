//! Notification channels for accepted orders.
//!
//! Telegram is the mandatory channel: the order handler waits for it and reports its failure.
//! The spreadsheet webhook is optional and runs detached; its outcome is discarded.

mod handle;
mod sheet;
mod telegram;

pub use handle::{ChannelError, ChannelHandle};
pub use sheet::SheetWebhook;
pub use telegram::{SendMessageRequest, TelegramChannel};
