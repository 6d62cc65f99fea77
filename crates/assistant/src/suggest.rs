//! Follow-up suggestion generation.
//!
//! Suggestions are decorative: any failure (network, rate limit, or a reply
//! that isn't the JSON array we asked for) degrades to a static list instead
//! of failing the chat request.

use briar_core::{ChatMessage, ChatRequest, ModelProvider, RequestProfile};
use tracing::warn;

/// How many trailing messages inform the suggestion prompt.
const SUGGESTION_TAIL: usize = 3;

const FALLBACK_SUGGESTIONS: &[&str] = &[
    "What's the schedule for today?",
    "What clubs can I join?",
    "What events are coming up?",
];

/// Generate `count` follow-up questions from the conversation tail.
pub async fn generate_suggestions(
    provider: &dyn ModelProvider,
    profile: &RequestProfile,
    history: &[ChatMessage],
    count: usize,
) -> Vec<String> {
    let tail = briar_core::message::trailing_window(history, SUGGESTION_TAIL);
    let transcript: Vec<String> = tail
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str(), m.content))
        .collect();

    let system = format!(
        "You generate follow-up questions a student might ask their school \
         assistant next. Reply with ONLY a JSON array of exactly {count} short \
         questions. No prose, no code fences."
    );
    let user = format!("Conversation so far:\n{}", transcript.join("\n"));

    let request = ChatRequest::answer(
        profile,
        vec![ChatMessage::system(system), ChatMessage::user(user)],
    );

    match provider.complete(request).await {
        Ok(response) => match parse_suggestions(&response.content, count) {
            Some(suggestions) => suggestions,
            None => {
                warn!(content = %response.content, "unparseable suggestion reply, using fallback");
                fallback(count)
            }
        },
        Err(e) => {
            warn!(error = %e, "suggestion generation failed, using fallback");
            fallback(count)
        }
    }
}

fn parse_suggestions(content: &str, count: usize) -> Option<Vec<String>> {
    let parsed: Vec<String> = serde_json::from_str(content.trim()).ok()?;
    let suggestions: Vec<String> = parsed
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .take(count)
        .collect();
    if suggestions.is_empty() {
        None
    } else {
        Some(suggestions)
    }
}

fn fallback(count: usize) -> Vec<String> {
    FALLBACK_SUGGESTIONS
        .iter()
        .take(count)
        .map(|s| s.to_string())
        .collect()
}
