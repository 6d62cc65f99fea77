//! # Briar Core
//!
//! Domain types, traits, and error definitions for the Briar school
//! assistant. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem seam is defined as a trait here. Implementations live in
//! their respective crates. This enables:
//! - Swapping implementations via configuration (e.g. the relevance strategy)
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod knowledge;
pub mod message;
pub mod profile;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{Error, KnowledgeError, ModelError, ProfileError, Result};
pub use knowledge::{
    CalendarEvent, Club, ContextSelector, ContextUsed, KnowledgeSnapshot, RelevanceSelection,
    RotationInfo, ScheduleInfo, Teacher,
};
pub use message::{ChatMessage, ChatRole};
pub use profile::{PersonalContext, ProfileRepository, StudentProfile, TodoItem};
pub use provider::{ChatRequest, ChatResponse, ModelProvider, RequestProfile, TokenUsage};
