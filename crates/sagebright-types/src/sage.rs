//! Wire types for the Sage completion endpoint.
//!
//! The endpoint accepts `{model, messages, temperature, max_tokens,
//! voice_injection}` and returns `{choices: [{message: {content}}]}`.
//! Non-2xx responses surface as [`SageApiError::Http`] carrying status and
//! status text.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Role of a message in a Sage completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SageRole {
    System,
    User,
}

impl fmt::Display for SageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SageRole::System => write!(f, "system"),
            SageRole::User => write!(f, "user"),
        }
    }
}

impl FromStr for SageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(SageRole::System),
            "user" => Ok(SageRole::User),
            other => Err(format!("invalid sage role: '{other}'")),
        }
    }
}

/// A single message in a completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SagePromptMessage {
    pub role: SageRole,
    pub content: String,
}

/// Request payload for the Sage completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SageRequest {
    pub model: String,
    pub messages: Vec<SagePromptMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Name of the voiceprint applied to the system prompt.
    pub voice_injection: String,
}

/// One completion choice in a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SageChoice {
    pub message: SageChoiceMessage,
}

/// The message body of a completion choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SageChoiceMessage {
    pub content: String,
}

/// Response payload from the Sage completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SageResponse {
    pub choices: Vec<SageChoice>,
}

impl SageResponse {
    /// Content of the first choice, when present.
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

/// Errors from the Sage completion endpoint.
#[derive(Debug, thiserror::Error)]
pub enum SageApiError {
    #[error("sage endpoint returned {status} {status_text}")]
    Http { status: u16, status_text: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("sage endpoint returned no choices")]
    EmptyResponse,
}
