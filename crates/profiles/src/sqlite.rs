//! SQLite profile storage.
//!
//! One row per user holding the whole profile document as JSON. Reads and
//! writes are whole-document, which keeps the schema trivial and matches the
//! access pattern (the assistant always needs the full bundle anyway).

use async_trait::async_trait;
use briar_core::{ChatMessage, ProfileError, ProfileRepository, StudentProfile, TodoItem};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserDocument {
    #[serde(default)]
    profile: StudentProfile,
    #[serde(default)]
    todos: Vec<TodoItem>,
    #[serde(default)]
    history: Vec<ChatMessage>,
}

/// A durable [`ProfileRepository`] backed by a single SQLite file.
pub struct SqliteProfiles {
    pool: SqlitePool,
    max_history: usize,
    // Mutations are read-modify-write over the whole document; serialize
    // them so concurrent requests for the same user cannot lose updates.
    write_lock: Mutex<()>,
}

impl SqliteProfiles {
    /// Open (or create) the database at `path`. Pass `":memory:"` for an
    /// ephemeral in-process database in tests.
    pub async fn new(path: &str, max_history: usize) -> Result<Self, ProfileError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| ProfileError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| ProfileError::Storage(format!("Failed to open SQLite: {e}")))?;

        let repo = Self {
            pool,
            max_history,
            write_lock: Mutex::new(()),
        };
        repo.run_migrations().await?;
        info!("SQLite profile store initialized at {path}");
        Ok(repo)
    }

    async fn run_migrations(&self) -> Result<(), ProfileError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                user_id    TEXT PRIMARY KEY,
                document   TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| ProfileError::Storage(format!("users table: {e}")))?;
        Ok(())
    }

    async fn load_document(&self, user_id: &str) -> Result<UserDocument, ProfileError> {
        let row = sqlx::query("SELECT document FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ProfileError::Storage(e.to_string()))?;

        match row {
            Some(row) => {
                let raw: String = row.get("document");
                serde_json::from_str(&raw)
                    .map_err(|e| ProfileError::Storage(format!("corrupt document: {e}")))
            }
            None => Ok(UserDocument::default()),
        }
    }

    async fn save_document(&self, user_id: &str, doc: &UserDocument) -> Result<(), ProfileError> {
        let raw = serde_json::to_string(doc)
            .map_err(|e| ProfileError::Storage(format!("serialize document: {e}")))?;
        sqlx::query(
            r#"
            INSERT INTO users (user_id, document, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                document = excluded.document,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(raw)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| ProfileError::Storage(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for SqliteProfiles {
    async fn profile(&self, user_id: &str) -> Result<StudentProfile, ProfileError> {
        Ok(self.load_document(user_id).await?.profile)
    }

    async fn update_profile(
        &self,
        user_id: &str,
        profile: StudentProfile,
    ) -> Result<(), ProfileError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load_document(user_id).await?;
        doc.profile = profile;
        self.save_document(user_id, &doc).await
    }

    async fn todos(&self, user_id: &str) -> Result<Vec<TodoItem>, ProfileError> {
        Ok(self.load_document(user_id).await?.todos)
    }

    async fn add_todo(&self, user_id: &str, text: String) -> Result<TodoItem, ProfileError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load_document(user_id).await?;
        let todo = TodoItem::new(text);
        doc.todos.push(todo.clone());
        self.save_document(user_id, &doc).await?;
        Ok(todo)
    }

    async fn set_todo_done(
        &self,
        user_id: &str,
        todo_id: Uuid,
        done: bool,
    ) -> Result<TodoItem, ProfileError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load_document(user_id).await?;
        let todo = doc
            .todos
            .iter_mut()
            .find(|t| t.id == todo_id)
            .ok_or_else(|| ProfileError::TodoNotFound(todo_id.to_string()))?;
        todo.done = done;
        let updated = todo.clone();
        self.save_document(user_id, &doc).await?;
        Ok(updated)
    }

    async fn remove_todo(&self, user_id: &str, todo_id: Uuid) -> Result<(), ProfileError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load_document(user_id).await?;
        let before = doc.todos.len();
        doc.todos.retain(|t| t.id != todo_id);
        if doc.todos.len() == before {
            return Err(ProfileError::TodoNotFound(todo_id.to_string()));
        }
        self.save_document(user_id, &doc).await
    }

    async fn history(&self, user_id: &str) -> Result<Vec<ChatMessage>, ProfileError> {
        Ok(self.load_document(user_id).await?.history)
    }

    async fn append_history(
        &self,
        user_id: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<(), ProfileError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load_document(user_id).await?;
        doc.history.extend(messages);
        let len = doc.history.len();
        if len > self.max_history {
            doc.history.drain(..len - self.max_history);
        }
        self.save_document(user_id, &doc).await
    }

    async fn clear_history(&self, user_id: &str) -> Result<(), ProfileError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load_document(user_id).await?;
        doc.history.clear();
        self.save_document(user_id, &doc).await
    }
}
