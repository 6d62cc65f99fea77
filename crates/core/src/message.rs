//! Conversation message types.
//!
//! These are the value objects that flow through the system: the gateway
//! receives a user message, the assistant composes a model request from the
//! trailing history window, and both turns land back in the profile store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
    /// System instructions (persona, mode, injected context)
    System,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: ChatRole,

    /// The text content
    pub content: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// The trailing window over a conversation: the most recent `window` entries
/// in original order. Older turns are silently dropped, never summarized.
pub fn trailing_window(history: &[ChatMessage], window: usize) -> &[ChatMessage] {
    let start = history.len().saturating_sub(window);
    &history[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = ChatMessage::user("Who teaches Chemistry?");
        assert_eq!(msg.role, ChatRole::User);
        assert_eq!(msg.content, "Who teaches Chemistry?");
        assert!(!msg.id.is_empty());
    }

    #[test]
    fn message_serialization_roundtrip() {
        let msg = ChatMessage::assistant("Dr. Okafor teaches Chemistry.");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"assistant\""));
        let back: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back.role, ChatRole::Assistant);
        assert_eq!(back.content, msg.content);
    }

    #[test]
    fn trailing_window_keeps_most_recent_in_order() {
        let history: Vec<ChatMessage> = (0..11)
            .map(|i| ChatMessage::user(format!("message {i}")))
            .collect();

        let window = trailing_window(&history, 10);
        assert_eq!(window.len(), 10);
        assert_eq!(window[0].content, "message 1");
        assert_eq!(window[9].content, "message 10");
    }

    #[test]
    fn trailing_window_shorter_history_untouched() {
        let history = vec![ChatMessage::user("only one")];
        assert_eq!(trailing_window(&history, 10).len(), 1);
    }
}
