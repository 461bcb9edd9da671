//! Chat message log and the readiness-gated Sage messenger.

pub mod log;
pub mod messenger;

pub use log::MessageLog;
pub use messenger::{ChatHandler, SageMessenger, SendReceipt};
