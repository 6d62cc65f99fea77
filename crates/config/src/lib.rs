//! Configuration loading, validation, and management for Briar.
//!
//! Loads configuration from a TOML file (default `briar.toml` in the working
//! directory) with environment variable overrides. Validates all settings at
//! startup so bad values fail fast instead of misbehaving mid-conversation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `briar.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the model backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Knowledge base settings
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Conversation settings
    #[serde(default)]
    pub chat: ChatConfig,

    /// Model backend settings
    #[serde(default)]
    pub model: ModelConfig,

    /// HTTP gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Student profile storage settings
    #[serde(default)]
    pub profiles: ProfilesConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("knowledge", &self.knowledge)
            .field("chat", &self.chat)
            .field("model", &self.model)
            .field("gateway", &self.gateway)
            .field("profiles", &self.profiles)
            .finish()
    }
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Directory holding the knowledge source files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// How long a loaded snapshot stays fresh, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Maximum upcoming calendar events injected into a prompt.
    #[serde(default = "default_max_events")]
    pub max_events: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_cache_ttl_secs() -> u64 {
    300
}
fn default_max_events() -> usize {
    5
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            cache_ttl_secs: default_cache_ttl_secs(),
            max_events: default_max_events(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// How many trailing history messages ride along with each request.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Follow-up suggestions generated after each answer.
    #[serde(default = "default_suggestion_count")]
    pub suggestion_count: usize,

    /// Maximum accepted length of a student message, in characters.
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,

    /// Stored history cap per user.
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

fn default_history_window() -> usize {
    10
}
fn default_suggestion_count() -> usize {
    3
}
fn default_max_message_len() -> usize {
    2000
}
fn default_max_history() -> usize {
    100
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            suggestion_count: default_suggestion_count(),
            max_message_len: default_max_message_len(),
            max_history: default_max_history(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Base URL of the chat-completion API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model used for full answers.
    #[serde(default = "default_answer_model")]
    pub answer_model: String,

    /// Cheaper model used for follow-up suggestions.
    #[serde(default = "default_suggestion_model")]
    pub suggestion_model: String,

    #[serde(default = "default_answer_temperature")]
    pub answer_temperature: f32,

    #[serde(default = "default_answer_max_tokens")]
    pub answer_max_tokens: u32,

    #[serde(default = "default_presence_penalty")]
    pub presence_penalty: f32,

    #[serde(default = "default_frequency_penalty")]
    pub frequency_penalty: f32,

    #[serde(default = "default_suggestion_temperature")]
    pub suggestion_temperature: f32,

    #[serde(default = "default_suggestion_max_tokens")]
    pub suggestion_max_tokens: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_answer_model() -> String {
    "gpt-4-turbo-preview".into()
}
fn default_suggestion_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_answer_temperature() -> f32 {
    0.7
}
fn default_answer_max_tokens() -> u32 {
    1000
}
fn default_presence_penalty() -> f32 {
    0.6
}
fn default_frequency_penalty() -> f32 {
    0.3
}
fn default_suggestion_temperature() -> f32 {
    0.8
}
fn default_suggestion_max_tokens() -> u32 {
    150
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            answer_model: default_answer_model(),
            suggestion_model: default_suggestion_model(),
            answer_temperature: default_answer_temperature(),
            answer_max_tokens: default_answer_max_tokens(),
            presence_penalty: default_presence_penalty(),
            frequency_penalty: default_frequency_penalty(),
            suggestion_temperature: default_suggestion_temperature(),
            suggestion_max_tokens: default_suggestion_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    3001
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilesConfig {
    /// Storage backend: "memory" or "sqlite".
    #[serde(default = "default_profiles_backend")]
    pub backend: String,

    /// SQLite database path (used when backend = "sqlite").
    #[serde(default = "default_profiles_db")]
    pub db_path: PathBuf,
}

fn default_profiles_backend() -> String {
    "sqlite".into()
}
fn default_profiles_db() -> PathBuf {
    PathBuf::from("briar.db")
}

impl Default for ProfilesConfig {
    fn default() -> Self {
        Self {
            backend: default_profiles_backend(),
            db_path: default_profiles_db(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `briar.toml` in the working directory.
    ///
    /// Environment variable overrides (highest priority):
    /// - `BRIAR_API_KEY`, then `OPENAI_API_KEY`
    /// - `BRIAR_MODEL`
    /// - `BRIAR_DATA_DIR`
    /// - `BRIAR_PORT`
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(Path::new("briar.toml"))?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("BRIAR_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("BRIAR_MODEL") {
            config.model.answer_model = model;
        }

        if let Ok(dir) = std::env::var("BRIAR_DATA_DIR") {
            config.knowledge.data_dir = PathBuf::from(dir);
        }

        if let Ok(port) = std::env::var("BRIAR_PORT") {
            config.gateway.port = port
                .parse()
                .map_err(|_| ConfigError::Validation(format!("invalid BRIAR_PORT: {port}")))?;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.knowledge.cache_ttl_secs == 0 {
            return Err(ConfigError::Validation(
                "knowledge.cache_ttl_secs must be > 0".into(),
            ));
        }

        if !(0.0..=2.0).contains(&self.model.answer_temperature) {
            return Err(ConfigError::Validation(
                "model.answer_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if !(0.0..=2.0).contains(&self.model.suggestion_temperature) {
            return Err(ConfigError::Validation(
                "model.suggestion_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.chat.max_message_len == 0 {
            return Err(ConfigError::Validation(
                "chat.max_message_len must be > 0".into(),
            ));
        }

        match self.profiles.backend.as_str() {
            "memory" | "sqlite" => {}
            other => {
                return Err(ConfigError::Validation(format!(
                    "profiles.backend must be \"memory\" or \"sqlite\", got \"{other}\""
                )));
            }
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for `briar init`-style output).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            knowledge: KnowledgeConfig::default(),
            chat: ChatConfig::default(),
            model: ModelConfig::default(),
            gateway: GatewayConfig::default(),
            profiles: ProfilesConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.knowledge.cache_ttl_secs, 300);
        assert_eq!(config.chat.history_window, 10);
        assert_eq!(config.gateway.port, 3001);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.model.answer_model, config.model.answer_model);
        assert_eq!(parsed.chat.max_message_len, config.chat.max_message_len);
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/briar.toml")).unwrap();
        assert_eq!(config.model.answer_model, "gpt-4-turbo-preview");
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            model: ModelConfig {
                answer_temperature: 5.0,
                ..ModelConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_profile_backend_rejected() {
        let config = AppConfig {
            profiles: ProfilesConfig {
                backend: "postgres".into(),
                ..ProfilesConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[knowledge]\ncache_ttl_secs = 60\n\n[gateway]\nport = 8080"
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.knowledge.cache_ttl_secs, 60);
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.chat.history_window, 10);
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
