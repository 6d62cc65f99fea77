//! TTL-cached knowledge snapshot loader.
//!
//! All six sources load concurrently and become one immutable
//! [`KnowledgeSnapshot`] behind an `Arc`. The snapshot is all-or-nothing: a
//! failure in any source aborts the reload, and if a previous snapshot
//! exists the store serves it stale rather than failing the request.

use briar_core::{
    Club, KnowledgeError, KnowledgeSnapshot, Result, ScheduleInfo, Teacher,
};
use chrono::{Duration, Utc};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::ics;

/// Loads and caches the knowledge base from a data directory.
///
/// Expected files: `teachers.json`, `schedule.json`, `rooms.json`,
/// `clubs.json`, `calendar.ics`, `handbook.md`.
pub struct KnowledgeStore {
    data_dir: PathBuf,
    ttl: Duration,
    cached: RwLock<Option<Arc<KnowledgeSnapshot>>>,
}

impl KnowledgeStore {
    pub fn new(data_dir: impl Into<PathBuf>, ttl_secs: u64) -> Self {
        Self {
            data_dir: data_dir.into(),
            ttl: Duration::seconds(ttl_secs as i64),
            cached: RwLock::new(None),
        }
    }

    /// The current snapshot, reloading from disk if the cache is stale.
    ///
    /// Concurrent callers during a reload may each load; the last writer
    /// wins, which is harmless since snapshots are equivalent reads of the
    /// same files.
    pub async fn snapshot(&self) -> Result<Arc<KnowledgeSnapshot>> {
        let now = Utc::now();

        let previous = {
            let guard = self.cached.read().await;
            if let Some(snap) = guard.as_ref() {
                if now - snap.loaded_at < self.ttl {
                    return Ok(Arc::clone(snap));
                }
            }
            guard.clone()
        };

        match self.load().await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                *self.cached.write().await = Some(Arc::clone(&snapshot));
                Ok(snapshot)
            }
            Err(e) => match previous {
                Some(stale) => {
                    warn!(error = %e, "knowledge reload failed, serving stale snapshot");
                    Ok(stale)
                }
                None => Err(e),
            },
        }
    }

    /// Drop the cached snapshot so the next request reloads from disk.
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
        debug!("knowledge cache invalidated");
    }

    async fn load(&self) -> Result<KnowledgeSnapshot> {
        let dir = &self.data_dir;
        let (teachers, schedule, rooms, clubs, events, handbook) = tokio::try_join!(
            read_json::<Vec<Teacher>>(dir, "teachers.json"),
            read_json::<ScheduleInfo>(dir, "schedule.json"),
            read_json::<serde_json::Value>(dir, "rooms.json"),
            read_json::<Vec<Club>>(dir, "clubs.json"),
            read_calendar(dir),
            read_text(dir, "handbook.md"),
        )?;

        info!(
            teachers = teachers.len(),
            clubs = clubs.len(),
            events = events.len(),
            "knowledge base loaded"
        );

        Ok(KnowledgeSnapshot {
            teachers,
            schedule,
            rooms,
            clubs,
            events,
            handbook,
            loaded_at: Utc::now(),
        })
    }
}

async fn read_text(dir: &Path, name: &str) -> Result<String> {
    tokio::fs::read_to_string(dir.join(name))
        .await
        .map_err(|e| KnowledgeError::read(name, e.to_string()).into())
}

async fn read_json<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<T> {
    let raw = read_text(dir, name).await?;
    serde_json::from_str(&raw).map_err(|e| KnowledgeError::parse(name, e.to_string()).into())
}

async fn read_calendar(dir: &Path) -> Result<Vec<briar_core::CalendarEvent>> {
    let raw = read_text(dir, "calendar.ics").await?;
    ics::parse_events(&raw).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_valid_sources(dir: &Path) {
        fs::write(
            dir.join("teachers.json"),
            r#"[{"name": "Ms. Patel", "subjects": ["Math"], "email": "patel@school.edu"}]"#,
        )
        .unwrap();
        fs::write(
            dir.join("schedule.json"),
            r#"{"rotation_calendar": {"2025-09-08": "Day 2"}, "rotation": {"current_day": "Day 1"}}"#,
        )
        .unwrap();
        fs::write(dir.join("rooms.json"), r#"{"Science 204": "second floor"}"#).unwrap();
        fs::write(
            dir.join("clubs.json"),
            r#"[{"name": "Robotics Club", "description": "Build robots"}]"#,
        )
        .unwrap();
        fs::write(
            dir.join("calendar.ics"),
            "BEGIN:VEVENT\nSUMMARY:Fall Concert\nDTSTART:20250915T190000Z\nEND:VEVENT\n",
        )
        .unwrap();
        fs::write(dir.join("handbook.md"), "# Handbook\nNo running in halls.").unwrap();
    }

    #[tokio::test]
    async fn loads_all_sources() {
        let dir = tempfile::tempdir().unwrap();
        write_valid_sources(dir.path());

        let store = KnowledgeStore::new(dir.path(), 300);
        let snap = store.snapshot().await.unwrap();
        assert_eq!(snap.teachers.len(), 1);
        assert_eq!(snap.clubs[0].name, "Robotics Club");
        assert_eq!(snap.events.len(), 1);
        assert!(snap.handbook.contains("No running"));
    }

    #[tokio::test]
    async fn fresh_snapshot_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        write_valid_sources(dir.path());

        let store = KnowledgeStore::new(dir.path(), 300);
        let first = store.snapshot().await.unwrap();

        // Break the files; the fresh cache must still serve.
        fs::write(dir.path().join("teachers.json"), "not json").unwrap();
        let second = store.snapshot().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn invalidate_forces_reload() {
        let dir = tempfile::tempdir().unwrap();
        write_valid_sources(dir.path());

        let store = KnowledgeStore::new(dir.path(), 300);
        store.snapshot().await.unwrap();

        fs::write(
            dir.path().join("teachers.json"),
            r#"[{"name": "Mr. Diaz"}, {"name": "Ms. Patel"}]"#,
        )
        .unwrap();
        store.invalidate().await;
        let snap = store.snapshot().await.unwrap();
        assert_eq!(snap.teachers.len(), 2);
    }

    #[tokio::test]
    async fn expired_snapshot_reloads_to_distinct_equivalent() {
        let dir = tempfile::tempdir().unwrap();
        write_valid_sources(dir.path());

        let store = KnowledgeStore::new(dir.path(), 1);
        let first = store.snapshot().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

        let second = store.snapshot().await.unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.teachers.len(), second.teachers.len());
        assert_eq!(first.events[0].summary, second.events[0].summary);
    }

    #[tokio::test]
    async fn failed_reload_serves_stale_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        write_valid_sources(dir.path());

        // Zero-ish TTL so the second call always reloads.
        let store = KnowledgeStore::new(dir.path(), 1);
        let first = store.snapshot().await.unwrap();

        fs::write(dir.path().join("calendar.ics"), "BEGIN:VEVENT\nEND:VEVENT\n").unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

        let served = store.snapshot().await.unwrap();
        assert!(Arc::ptr_eq(&first, &served));
        assert_eq!(served.events[0].summary, "Fall Concert");
    }

    #[tokio::test]
    async fn first_load_failure_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // Missing files entirely.
        let store = KnowledgeStore::new(dir.path(), 300);
        assert!(store.snapshot().await.is_err());
    }

    #[tokio::test]
    async fn malformed_source_fails_whole_load() {
        let dir = tempfile::tempdir().unwrap();
        write_valid_sources(dir.path());
        fs::write(dir.path().join("clubs.json"), "[{").unwrap();

        let store = KnowledgeStore::new(dir.path(), 300);
        assert!(store.snapshot().await.is_err());
    }
}
