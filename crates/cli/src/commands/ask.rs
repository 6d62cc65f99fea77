//! `briar ask` — one question, straight from the terminal.
//!
//! Builds the same pipeline the gateway uses, but with an ephemeral
//! in-memory profile store; nothing is persisted between invocations.

use briar_assistant::{Assistant, AssistantOptions, ChatMode};
use briar_config::AppConfig;
use briar_core::ModelProvider;
use briar_knowledge::{KeywordSelector, KnowledgeStore};
use briar_profiles::InMemoryProfiles;
use briar_providers::OpenAiClient;
use std::sync::Arc;

pub async fn run(message: &str, mode: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    let api_key = config
        .api_key
        .clone()
        .ok_or("no API key configured; set BRIAR_API_KEY or api_key in briar.toml")?;

    let provider: Arc<dyn ModelProvider> =
        Arc::new(OpenAiClient::from_config(&config.model, api_key));
    let store = Arc::new(KnowledgeStore::new(
        config.knowledge.data_dir.clone(),
        config.knowledge.cache_ttl_secs,
    ));
    let assistant = Assistant::new(
        store,
        Box::new(KeywordSelector::new(config.knowledge.max_events)),
        provider,
        Arc::new(InMemoryProfiles::new(config.chat.max_history)),
        AssistantOptions::from_config(&config),
    );

    let reply = assistant
        .respond("terminal", message, ChatMode::parse(mode))
        .await?;

    println!("{}", reply.message.content);

    if !reply.suggestions.is_empty() {
        println!("\nYou could also ask:");
        for suggestion in &reply.suggestions {
            println!("  - {suggestion}");
        }
    }

    Ok(())
}
