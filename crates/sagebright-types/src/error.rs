use thiserror::Error;

use crate::notice::Notice;
use crate::readiness::{format_blockers, Blocker};

/// Errors from the session backend and org directory.
///
/// HTTP 401, 403, and 500 are all carried as [`BackendError::Http`]; the
/// core treats them identically (reset to unauthenticated plus report), so
/// distinguishing them stays a backend concern.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend returned HTTP {status}")]
    Http { status: u16 },

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

/// Errors from attempting to send a message to Sage.
#[derive(Debug, Error)]
pub enum SendError {
    /// The context gate rejected the send; no network call was made.
    #[error("not ready to send: {}", format_blockers(.blockers))]
    Blocked { blockers: Vec<Blocker> },

    /// The downstream completion call failed after the gate passed.
    #[error("message delivery failed: {0}")]
    Delivery(String),
}

impl SendError {
    /// The user-facing notice for this failure. Presentation is left to
    /// the embedding UI.
    pub fn notice(&self) -> Notice {
        match self {
            SendError::Blocked { blockers } => Notice::warning(format!(
                "Please wait a moment: {}",
                format_blockers(blockers)
            )),
            SendError::Delivery(message) if !message.is_empty() => {
                Notice::destructive(message.clone())
            }
            SendError::Delivery(_) => {
                Notice::destructive("Something went wrong sending your message.")
            }
        }
    }
}
