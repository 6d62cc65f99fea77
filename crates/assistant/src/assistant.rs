//! The conversation orchestrator.
//!
//! One `respond` call runs the whole pipeline: validate the message, pin a
//! knowledge snapshot, select relevant context, assemble the prompt, call
//! the model, persist both turns, and generate follow-up suggestions. The
//! snapshot is taken once per request so every block in the prompt reflects
//! the same knowledge version.

use briar_config::AppConfig;
use briar_core::message::trailing_window;
use briar_core::{
    ChatMessage, ChatRequest, ContextSelector, ContextUsed, Error, ModelProvider,
    ProfileRepository, RequestProfile, Result, TokenUsage,
};
use briar_knowledge::KnowledgeStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::persona::ChatMode;
use crate::prompt::build_system_prompt;
use crate::suggest::generate_suggestions;

/// Everything the caller gets back from one chat turn.
#[derive(Debug, Clone)]
pub struct AssistantReply {
    pub message: ChatMessage,
    pub context_used: ContextUsed,
    pub usage: Option<TokenUsage>,
    pub suggestions: Vec<String>,
}

/// Tunables lifted out of [`AppConfig`] at construction time.
#[derive(Debug, Clone)]
pub struct AssistantOptions {
    pub history_window: usize,
    pub suggestion_count: usize,
    pub max_message_len: usize,
    pub answer: RequestProfile,
    pub suggestion: RequestProfile,
}

impl AssistantOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            history_window: config.chat.history_window,
            suggestion_count: config.chat.suggestion_count,
            max_message_len: config.chat.max_message_len,
            answer: RequestProfile {
                model: config.model.answer_model.clone(),
                temperature: config.model.answer_temperature,
                max_tokens: config.model.answer_max_tokens,
                presence_penalty: Some(config.model.presence_penalty),
                frequency_penalty: Some(config.model.frequency_penalty),
            },
            suggestion: RequestProfile {
                model: config.model.suggestion_model.clone(),
                temperature: config.model.suggestion_temperature,
                max_tokens: config.model.suggestion_max_tokens,
                presence_penalty: None,
                frequency_penalty: None,
            },
        }
    }
}

pub struct Assistant {
    store: Arc<KnowledgeStore>,
    selector: Box<dyn ContextSelector>,
    provider: Arc<dyn ModelProvider>,
    profiles: Arc<dyn ProfileRepository>,
    options: AssistantOptions,
}

impl Assistant {
    pub fn new(
        store: Arc<KnowledgeStore>,
        selector: Box<dyn ContextSelector>,
        provider: Arc<dyn ModelProvider>,
        profiles: Arc<dyn ProfileRepository>,
        options: AssistantOptions,
    ) -> Self {
        Self {
            store,
            selector,
            provider,
            profiles,
            options,
        }
    }

    /// Handle one student message end to end.
    pub async fn respond(
        &self,
        user_id: &str,
        message: &str,
        mode: ChatMode,
    ) -> Result<AssistantReply> {
        let message = message.trim();
        if message.is_empty() {
            return Err(Error::InvalidInput("message must not be empty".into()));
        }
        if message.chars().count() > self.options.max_message_len {
            return Err(Error::InvalidInput(format!(
                "message exceeds {} characters",
                self.options.max_message_len
            )));
        }

        let now = Utc::now();
        let snapshot = self.store.snapshot().await?;
        let selection = self.selector.select(message, &snapshot, now);
        let context_used = selection.summary();

        let mut personal = self.profiles.personal_context(user_id).await?;
        // Only open todos reach the prompt, capped so they never crowd out
        // the knowledge blocks.
        personal.todos.retain(|t| !t.done);
        personal.todos.truncate(5);
        let history = self.profiles.history(user_id).await?;
        let window = trailing_window(&history, self.options.history_window);

        let system = build_system_prompt(mode, &selection, &snapshot, &personal, now)?;

        let mut messages = Vec::with_capacity(window.len() + 2);
        messages.push(ChatMessage::system(system));
        messages.extend_from_slice(window);
        let user_turn = ChatMessage::user(message);
        messages.push(user_turn.clone());

        debug!(
            user = user_id,
            mode = mode.as_str(),
            window = window.len(),
            context = ?context_used,
            "dispatching chat request"
        );

        let response = self
            .provider
            .complete(ChatRequest::answer(&self.options.answer, messages))
            .await
            .map_err(Error::from)?;

        let reply = ChatMessage::assistant(response.content);
        self.profiles
            .append_history(user_id, vec![user_turn.clone(), reply.clone()])
            .await?;

        let mut updated = history;
        updated.push(user_turn);
        updated.push(reply.clone());
        let suggestions = generate_suggestions(
            self.provider.as_ref(),
            &self.options.suggestion,
            &updated,
            self.options.suggestion_count,
        )
        .await;

        info!(
            user = user_id,
            tokens = response.usage.map(|u| u.total_tokens),
            "chat turn complete"
        );

        Ok(AssistantReply {
            message: reply,
            context_used,
            usage: response.usage,
            suggestions,
        })
    }
}
