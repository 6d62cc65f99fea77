//! Model provider trait — the abstraction over chat-completion backends.
//!
//! A [`ModelProvider`] knows how to send a conversation to a hosted language
//! model and return the generated reply. The assistant core calls it through
//! the trait so the backend can be swapped (OpenAI, a compatible proxy, or a
//! recording mock in tests) without touching prompt assembly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::message::ChatMessage;

/// A single chat-completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The model to use (e.g. "gpt-4-turbo-preview").
    pub model: String,

    /// The full ordered message list, system block first.
    pub messages: Vec<ChatMessage>,

    /// Temperature (0.0 = deterministic, higher = more varied).
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Penalty for tokens already present in the conversation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,

    /// Penalty proportional to token repetition count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
}

fn default_temperature() -> f32 {
    0.7
}

impl ChatRequest {
    /// A request shaped for full student-facing answers.
    pub fn answer(profile: &RequestProfile, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: profile.model.clone(),
            messages,
            temperature: profile.temperature,
            max_tokens: Some(profile.max_tokens),
            presence_penalty: profile.presence_penalty,
            frequency_penalty: profile.frequency_penalty,
        }
    }
}

/// Sampling parameters for one class of request.
///
/// Answers and follow-up suggestions use different profiles: suggestions run
/// hotter, shorter, and on a cheaper model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestProfile {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The generated assistant text.
    pub content: String,

    /// Token usage statistics, when the backend reports them.
    pub usage: Option<TokenUsage>,

    /// Which model actually responded (may differ from requested).
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core provider trait. Every chat backend implements this.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// A human-readable name for this provider (e.g. "openai").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_request_carries_profile() {
        let profile = RequestProfile {
            model: "gpt-4-turbo-preview".into(),
            temperature: 0.7,
            max_tokens: 1000,
            presence_penalty: Some(0.6),
            frequency_penalty: Some(0.3),
        };
        let req = ChatRequest::answer(&profile, vec![ChatMessage::system("persona")]);
        assert_eq!(req.model, "gpt-4-turbo-preview");
        assert_eq!(req.max_tokens, Some(1000));
        assert_eq!(req.presence_penalty, Some(0.6));
        assert_eq!(req.messages.len(), 1);
    }

    #[test]
    fn optional_penalties_omitted_from_wire_form() {
        let req = ChatRequest {
            model: "gpt-3.5-turbo".into(),
            messages: vec![],
            temperature: 0.8,
            max_tokens: Some(150),
            presence_penalty: None,
            frequency_penalty: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("presence_penalty"));
        assert!(!json.contains("frequency_penalty"));
    }
}
