//! Student profile domain types and the repository seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProfileError;
use crate::message::ChatMessage;

/// A student's stored profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub preferences: Preferences,
    /// The student's own class schedule, carried opaquely.
    #[serde(default)]
    pub schedule: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preferences {
    /// Free-form notes the student asked the assistant to remember.
    #[serde(default)]
    pub notes: Vec<String>,
}

/// A to-do item on a student's personal list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: Uuid,
    pub text: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
}

impl TodoItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            done: false,
            created_at: Utc::now(),
        }
    }
}

/// Everything personal the prompt assembler may inject for one student.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonalContext {
    pub profile: StudentProfile,
    #[serde(default)]
    pub todos: Vec<TodoItem>,
}

/// Storage seam for per-student state. Backed by in-memory maps in tests
/// and SQLite in the server.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn profile(&self, user_id: &str) -> Result<StudentProfile, ProfileError>;

    async fn update_profile(
        &self,
        user_id: &str,
        profile: StudentProfile,
    ) -> Result<(), ProfileError>;

    async fn todos(&self, user_id: &str) -> Result<Vec<TodoItem>, ProfileError>;

    async fn add_todo(&self, user_id: &str, text: String) -> Result<TodoItem, ProfileError>;

    async fn set_todo_done(
        &self,
        user_id: &str,
        todo_id: Uuid,
        done: bool,
    ) -> Result<TodoItem, ProfileError>;

    async fn remove_todo(&self, user_id: &str, todo_id: Uuid) -> Result<(), ProfileError>;

    /// Stored conversation history, oldest first.
    async fn history(&self, user_id: &str) -> Result<Vec<ChatMessage>, ProfileError>;

    /// Append messages to the stored history. Implementations cap the stored
    /// list, dropping the oldest entries first.
    async fn append_history(
        &self,
        user_id: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<(), ProfileError>;

    async fn clear_history(&self, user_id: &str) -> Result<(), ProfileError>;

    /// The full personal bundle, for prompt assembly.
    async fn personal_context(&self, user_id: &str) -> Result<PersonalContext, ProfileError> {
        Ok(PersonalContext {
            profile: self.profile(user_id).await?,
            todos: self.todos(user_id).await?,
        })
    }
}
