//! Chat message types for the Sage assistant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Sage,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Sage => write!(f, "sage"),
        }
    }
}

impl FromStr for Sender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Sender::User),
            "sage" => Ok(Sender::Sage),
            other => Err(format!("invalid sender: '{other}'")),
        }
    }
}

/// Feedback applied to a Sage reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Liked,
    Disliked,
    Cleared,
}

/// A single message in the conversation.
///
/// Immutable after creation except for the feedback flags, which are
/// mutually exclusive: setting one clears the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SageMessage {
    pub id: Uuid,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub disliked: bool,
}

impl SageMessage {
    /// Create a user-authored message timestamped now.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(content, Sender::User)
    }

    /// Create a Sage-authored message timestamped now.
    pub fn sage(content: impl Into<String>) -> Self {
        Self::new(content, Sender::Sage)
    }

    fn new(content: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: Uuid::now_v7(),
            content: content.into(),
            sender,
            timestamp: Utc::now(),
            liked: false,
            disliked: false,
        }
    }

    /// Apply a feedback toggle, keeping liked/disliked mutually exclusive.
    pub fn apply_feedback(&mut self, feedback: Feedback) {
        match feedback {
            Feedback::Liked => {
                self.liked = true;
                self.disliked = false;
            }
            Feedback::Disliked => {
                self.liked = false;
                self.disliked = true;
            }
            Feedback::Cleared => {
                self.liked = false;
                self.disliked = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_roundtrip() {
        for sender in [Sender::User, Sender::Sage] {
            let s = sender.to_string();
            let parsed: Sender = s.parse().unwrap();
            assert_eq!(sender, parsed);
        }
    }

    #[test]
    fn test_message_constructors() {
        let msg = SageMessage::user("hi");
        assert_eq!(msg.sender, Sender::User);
        assert_eq!(msg.content, "hi");
        assert!(!msg.liked);
        assert!(!msg.disliked);

        let reply = SageMessage::sage("hello");
        assert_eq!(reply.sender, Sender::Sage);
    }

    #[test]
    fn test_feedback_is_mutually_exclusive() {
        let mut msg = SageMessage::sage("hello");

        msg.apply_feedback(Feedback::Liked);
        assert!(msg.liked);
        assert!(!msg.disliked);

        msg.apply_feedback(Feedback::Disliked);
        assert!(!msg.liked);
        assert!(msg.disliked);

        msg.apply_feedback(Feedback::Cleared);
        assert!(!msg.liked);
        assert!(!msg.disliked);
    }

    #[test]
    fn test_message_serde_defaults_feedback() {
        let json = format!(
            r#"{{"id":"{}","content":"hi","sender":"user","timestamp":"{}"}}"#,
            Uuid::now_v7(),
            Utc::now().to_rfc3339()
        );
        let msg: SageMessage = serde_json::from_str(&json).unwrap();
        assert!(!msg.liked);
        assert!(!msg.disliked);
    }
}
