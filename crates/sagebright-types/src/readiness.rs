//! Readiness verdict types.
//!
//! A [`ReadinessReport`] is derived, never stored: the evaluator recomputes
//! it from the current auth snapshot and voice selection on every input
//! change. Blockers are ordered session, org, voice so UI messages and
//! tests are deterministic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// A named reason the system is not ready to accept user interaction.
///
/// Derived `Ord` gives the stable precedence session > org > voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Blocker {
    Session,
    Org,
    Voice,
}

impl fmt::Display for Blocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Blocker::Session => write!(f, "session"),
            Blocker::Org => write!(f, "org"),
            Blocker::Voice => write!(f, "voice"),
        }
    }
}

impl FromStr for Blocker {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "session" => Ok(Blocker::Session),
            "org" => Ok(Blocker::Org),
            "voice" => Ok(Blocker::Voice),
            other => Err(format!("invalid blocker: '{other}'")),
        }
    }
}

/// Render a blocker list for user-facing messages ("session, org").
pub fn format_blockers(blockers: &[Blocker]) -> String {
    blockers
        .iter()
        .map(Blocker::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// The combined readiness verdict for the chat context.
///
/// Invariants:
/// - `is_context_ready` is false whenever any component flag is false.
/// - `blockers` names exactly the failing components, in session/org/voice
///   order.
/// - `ready_since` is set the instant `is_context_ready` first becomes true
///   and cleared when it becomes false again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub is_context_ready: bool,
    pub is_session_ready: bool,
    pub is_org_ready: bool,
    pub is_voice_ready: bool,
    /// Readiness has held continuously for the settle window.
    pub is_session_stable: bool,
    pub blockers: Vec<Blocker>,
    pub ready_since: Option<DateTime<Utc>>,
}

impl ReadinessReport {
    /// An all-unready report, as at first load before any fetch settles.
    pub fn unready() -> Self {
        Self {
            is_context_ready: false,
            is_session_ready: false,
            is_org_ready: false,
            is_voice_ready: true,
            is_session_stable: false,
            blockers: vec![Blocker::Session, Blocker::Org],
            ready_since: None,
        }
    }
}
