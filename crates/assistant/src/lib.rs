//! Conversation orchestration: persona, prompt assembly, the chat pipeline,
//! and follow-up suggestion generation.

pub mod assistant;
pub mod persona;
pub mod prompt;
pub mod suggest;

pub use assistant::{Assistant, AssistantOptions, AssistantReply};
pub use persona::ChatMode;
