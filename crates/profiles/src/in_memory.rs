//! In-memory profile storage. Everything is lost on restart.

use async_trait::async_trait;
use briar_core::{ChatMessage, ProfileError, ProfileRepository, StudentProfile, TodoItem};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default, Clone)]
struct UserRecord {
    profile: StudentProfile,
    todos: Vec<TodoItem>,
    history: Vec<ChatMessage>,
}

/// A per-process [`ProfileRepository`]. Used in tests and `--ephemeral` runs.
pub struct InMemoryProfiles {
    users: RwLock<HashMap<String, UserRecord>>,
    max_history: usize,
}

impl InMemoryProfiles {
    pub fn new(max_history: usize) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            max_history,
        }
    }
}

impl Default for InMemoryProfiles {
    fn default() -> Self {
        Self::new(100)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfiles {
    async fn profile(&self, user_id: &str) -> Result<StudentProfile, ProfileError> {
        Ok(self
            .users
            .read()
            .await
            .get(user_id)
            .map(|r| r.profile.clone())
            .unwrap_or_default())
    }

    async fn update_profile(
        &self,
        user_id: &str,
        profile: StudentProfile,
    ) -> Result<(), ProfileError> {
        self.users
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .profile = profile;
        Ok(())
    }

    async fn todos(&self, user_id: &str) -> Result<Vec<TodoItem>, ProfileError> {
        Ok(self
            .users
            .read()
            .await
            .get(user_id)
            .map(|r| r.todos.clone())
            .unwrap_or_default())
    }

    async fn add_todo(&self, user_id: &str, text: String) -> Result<TodoItem, ProfileError> {
        let todo = TodoItem::new(text);
        self.users
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .todos
            .push(todo.clone());
        Ok(todo)
    }

    async fn set_todo_done(
        &self,
        user_id: &str,
        todo_id: Uuid,
        done: bool,
    ) -> Result<TodoItem, ProfileError> {
        let mut users = self.users.write().await;
        let record = users
            .get_mut(user_id)
            .ok_or_else(|| ProfileError::NotFound(user_id.to_string()))?;
        let todo = record
            .todos
            .iter_mut()
            .find(|t| t.id == todo_id)
            .ok_or_else(|| ProfileError::TodoNotFound(todo_id.to_string()))?;
        todo.done = done;
        Ok(todo.clone())
    }

    async fn remove_todo(&self, user_id: &str, todo_id: Uuid) -> Result<(), ProfileError> {
        let mut users = self.users.write().await;
        let record = users
            .get_mut(user_id)
            .ok_or_else(|| ProfileError::NotFound(user_id.to_string()))?;
        let before = record.todos.len();
        record.todos.retain(|t| t.id != todo_id);
        if record.todos.len() == before {
            return Err(ProfileError::TodoNotFound(todo_id.to_string()));
        }
        Ok(())
    }

    async fn history(&self, user_id: &str) -> Result<Vec<ChatMessage>, ProfileError> {
        Ok(self
            .users
            .read()
            .await
            .get(user_id)
            .map(|r| r.history.clone())
            .unwrap_or_default())
    }

    async fn append_history(
        &self,
        user_id: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<(), ProfileError> {
        let mut users = self.users.write().await;
        let record = users.entry(user_id.to_string()).or_default();
        record.history.extend(messages);
        let len = record.history.len();
        if len > self.max_history {
            record.history.drain(..len - self.max_history);
        }
        Ok(())
    }

    async fn clear_history(&self, user_id: &str) -> Result<(), ProfileError> {
        if let Some(record) = self.users.write().await.get_mut(user_id) {
            record.history.clear();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_user_gets_default_profile() {
        let repo = InMemoryProfiles::default();
        let profile = repo.profile("nobody").await.unwrap();
        assert!(profile.name.is_empty());
    }

    #[tokio::test]
    async fn todo_lifecycle() {
        let repo = InMemoryProfiles::default();
        let todo = repo.add_todo("alice", "study for quiz".into()).await.unwrap();
        assert!(!todo.done);

        let updated = repo.set_todo_done("alice", todo.id, true).await.unwrap();
        assert!(updated.done);

        repo.remove_todo("alice", todo.id).await.unwrap();
        assert!(repo.todos("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_todo_is_an_error() {
        let repo = InMemoryProfiles::default();
        repo.add_todo("alice", "anything".into()).await.unwrap();
        let err = repo
            .set_todo_done("alice", Uuid::new_v4(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, ProfileError::TodoNotFound(_)));
    }

    #[tokio::test]
    async fn history_is_capped_oldest_first() {
        let repo = InMemoryProfiles::new(3);
        for i in 0..5 {
            repo.append_history("alice", vec![ChatMessage::user(format!("m{i}"))])
                .await
                .unwrap();
        }
        let history = repo.history("alice").await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].content, "m2");
        assert_eq!(history[2].content, "m4");
    }

    #[tokio::test]
    async fn users_are_isolated() {
        let repo = InMemoryProfiles::default();
        repo.append_history("alice", vec![ChatMessage::user("hi")])
            .await
            .unwrap();
        assert!(repo.history("bob").await.unwrap().is_empty());
    }
}
