//! Student profile and conversation history storage.
//!
//! Two backends implement [`briar_core::ProfileRepository`]:
//! - [`InMemoryProfiles`] — per-process maps, for tests and ephemeral runs
//! - [`SqliteProfiles`] — durable single-file storage for the server

pub mod in_memory;
pub mod sqlite;

pub use in_memory::InMemoryProfiles;
pub use sqlite::SqliteProfiles;
