//! Gateway: HTTP server for order intake.
//!
//! Single port serves the order endpoint (`/api/order`) and a health endpoint (`/`).

mod error;
mod order;
mod protocol;
mod server;

pub use error::{OrderError, MAX_UPSTREAM_DIAGNOSTIC};
pub use order::{handle_order, process_order};
pub use protocol::{
    coerce_string, is_truthy, validate_submission, OrderAccepted, Submission, ValidOrder,
    MIN_MESSAGE_LEN,
};
pub use server::{router, run_gateway, GatewayState};
