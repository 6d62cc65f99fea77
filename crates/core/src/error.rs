//! Error types for the Briar domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Briar operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Knowledge base errors ---
    #[error("Knowledge base error: {0}")]
    Knowledge(#[from] KnowledgeError),

    // --- Model errors ---
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    // --- Profile store errors ---
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Request validation ---
    #[error("Invalid request: {0}")]
    InvalidInput(String),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// A backing knowledge source could not be read or parsed.
///
/// Any one of these fails the entire snapshot reload — the knowledge base is
/// versioned-whole. Callers with a previously cached snapshot keep serving it.
#[derive(Debug, Clone, Error)]
pub enum KnowledgeError {
    #[error("Failed to read {source_name}: {reason}")]
    Read { source_name: String, reason: String },

    #[error("Failed to parse {source_name}: {reason}")]
    Parse { source_name: String, reason: String },
}

impl KnowledgeError {
    pub fn read(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Read {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn parse(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

/// Failures from the external model boundary.
///
/// Categories are kept distinct so callers can choose a retry policy:
/// rate limits map to "try again later", auth/unavailable to "service
/// unavailable". Nothing here is retried internally.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limited by model provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Model service unavailable: {0}")]
    Unavailable(String),

    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Profile not found: {0}")]
    NotFound(String),

    #[error("Todo item not found: {0}")]
    TodoNotFound(String),
}
