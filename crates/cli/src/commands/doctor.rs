//! `briar doctor` — Diagnose configuration and data health.

use briar_config::AppConfig;
use briar_core::{ChatMessage, ChatRequest, ModelProvider, RequestProfile};
use briar_knowledge::KnowledgeStore;
use briar_providers::OpenAiClient;

pub async fn run(ping: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("Briar Doctor — diagnostics");
    println!("==========================\n");

    let mut issues = 0;

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  ✅ API key configured");
    } else {
        println!("  ⚠️  No API key — set BRIAR_API_KEY or api_key in briar.toml");
        issues += 1;
    }

    let store = KnowledgeStore::new(
        config.knowledge.data_dir.clone(),
        config.knowledge.cache_ttl_secs,
    );
    match store.snapshot().await {
        Ok(snapshot) => {
            println!(
                "  ✅ Knowledge base loads ({} teachers, {} clubs, {} events)",
                snapshot.teachers.len(),
                snapshot.clubs.len(),
                snapshot.events.len()
            );
        }
        Err(e) => {
            println!("  ❌ Knowledge base failed to load: {e}");
            println!("     (data dir: {})", config.knowledge.data_dir.display());
            issues += 1;
        }
    }

    if ping {
        match config.api_key.clone() {
            Some(api_key) => {
                let client = OpenAiClient::from_config(&config.model, api_key);
                let probe = RequestProfile {
                    model: config.model.suggestion_model.clone(),
                    temperature: 0.0,
                    max_tokens: 1,
                    presence_penalty: None,
                    frequency_penalty: None,
                };
                let request = ChatRequest::answer(&probe, vec![ChatMessage::user("ping")]);
                match client.complete(request).await {
                    Ok(_) => println!("  ✅ Model backend reachable"),
                    Err(e) => {
                        println!("  ❌ Model backend check failed: {e}");
                        issues += 1;
                    }
                }
            }
            None => {
                println!("  ⚠️  Skipping backend ping (no API key)");
            }
        }
    }

    println!();
    if issues == 0 {
        println!("  All checks passed.");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
