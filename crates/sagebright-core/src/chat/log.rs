//! In-memory conversation log.
//!
//! Messages are immutable once appended except for the feedback toggles.

use std::sync::RwLock;

use uuid::Uuid;

use sagebright_types::chat::{Feedback, SageMessage};

/// Append-only log of the current conversation.
pub struct MessageLog {
    messages: RwLock<Vec<SageMessage>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self {
            messages: RwLock::new(Vec::new()),
        }
    }

    /// Append a message, returning its id.
    pub fn append(&self, message: SageMessage) -> Uuid {
        let id = message.id;
        self.messages
            .write()
            .expect("message log lock poisoned")
            .push(message);
        id
    }

    /// Snapshot of all messages in append order.
    pub fn messages(&self) -> Vec<SageMessage> {
        self.messages
            .read()
            .expect("message log lock poisoned")
            .clone()
    }

    pub fn len(&self) -> usize {
        self.messages.read().expect("message log lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply feedback to the message with the given id.
    ///
    /// Returns false when no such message exists.
    pub fn apply_feedback(&self, id: Uuid, feedback: Feedback) -> bool {
        let mut messages = self.messages.write().expect("message log lock poisoned");
        match messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.apply_feedback(feedback);
                true
            }
            None => false,
        }
    }

    /// Drop all messages (e.g. on sign-out).
    pub fn clear(&self) {
        self.messages
            .write()
            .expect("message log lock poisoned")
            .clear();
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let log = MessageLog::new();
        log.append(SageMessage::user("first"));
        log.append(SageMessage::sage("second"));

        let messages = log.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "first");
        assert_eq!(messages[1].content, "second");
    }

    #[test]
    fn test_feedback_by_id() {
        let log = MessageLog::new();
        let id = log.append(SageMessage::sage("hello"));

        assert!(log.apply_feedback(id, Feedback::Liked));
        assert!(log.messages()[0].liked);

        assert!(log.apply_feedback(id, Feedback::Disliked));
        let message = &log.messages()[0];
        assert!(!message.liked);
        assert!(message.disliked);
    }

    #[test]
    fn test_feedback_unknown_id_returns_false() {
        let log = MessageLog::new();
        assert!(!log.apply_feedback(Uuid::now_v7(), Feedback::Liked));
    }

    #[test]
    fn test_clear() {
        let log = MessageLog::new();
        log.append(SageMessage::user("hi"));
        assert!(!log.is_empty());
        log.clear();
        assert!(log.is_empty());
    }
}
