//! Voice parameter parsing.
//!
//! The voice persona is selected via a URL query parameter and validated
//! against the fixed persona set owned by the prompt assembler. Parsing is
//! total: an unknown name is recorded, not rejected, so callers can choose
//! between strict gating and silent fallback.

use serde::{Deserialize, Serialize};

use std::fmt;

/// Name of the persona used when no voice parameter is supplied.
pub const DEFAULT_VOICE: &str = "default";

/// Outcome of parsing the `voice` query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VoiceSelection {
    /// No parameter supplied; the default persona applies.
    Default,
    /// A parameter naming a known persona.
    Named { name: String },
    /// A parameter naming no known persona. The requested value is kept
    /// for diagnostics; resolution falls back to the default persona.
    Unknown { requested: String },
}

impl VoiceSelection {
    /// Parse a raw query-parameter value against the known persona set.
    ///
    /// Empty or whitespace-only values are treated as absent. Matching is
    /// case-insensitive; the canonical (lowercase) name is kept.
    pub fn parse(raw: Option<&str>, known: &[&str]) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return VoiceSelection::Default;
        };
        let lowered = raw.to_lowercase();
        if known.iter().any(|k| *k == lowered) {
            VoiceSelection::Named { name: lowered }
        } else {
            VoiceSelection::Unknown { requested: raw.to_string() }
        }
    }

    /// Whether this selection satisfies voice readiness (absent or known).
    pub fn is_ready(&self) -> bool {
        !matches!(self, VoiceSelection::Unknown { .. })
    }

    /// The persona name this selection resolves to.
    ///
    /// Unknown selections resolve to the default persona so a prompt can
    /// always be assembled.
    pub fn resolved_name(&self) -> &str {
        match self {
            VoiceSelection::Named { name } => name,
            VoiceSelection::Default | VoiceSelection::Unknown { .. } => DEFAULT_VOICE,
        }
    }
}

impl Default for VoiceSelection {
    fn default() -> Self {
        VoiceSelection::Default
    }
}

impl fmt::Display for VoiceSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoiceSelection::Default => write!(f, "{DEFAULT_VOICE}"),
            VoiceSelection::Named { name } => write!(f, "{name}"),
            VoiceSelection::Unknown { requested } => write!(f, "unknown({requested})"),
        }
    }
}
