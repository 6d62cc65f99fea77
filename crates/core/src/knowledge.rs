//! Knowledge base domain types.
//!
//! A [`KnowledgeSnapshot`] is an immutable, versioned-in-time bundle of every
//! institutional fact the assistant may cite: staff directory, rotating class
//! schedule, room directory, clubs, calendar events, and handbook text. It is
//! built whole by the knowledge store and never mutated afterwards — readers
//! hold an `Arc` and see either the old snapshot or the new one, never a mix.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A staff directory entry. Fields beyond the well-known ones ride along
/// opaquely so directory additions don't require a schema change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    pub name: String,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A club or activity directory entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Club {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A calendar event decoded from the institutional calendar feed.
///
/// Invariant: `start <= end`. The decoder rejects events that violate it.
/// All timestamps are normalized to UTC at parse time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub summary: String,
    #[serde(default)]
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub location: String,
}

/// The schedule document: an opaque body plus the rotation-day machinery.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleInfo {
    /// Maps `YYYY-MM-DD` date keys to rotation-day labels (e.g. "Day 3").
    #[serde(default)]
    pub rotation_calendar: HashMap<String, String>,

    #[serde(default)]
    pub rotation: RotationInfo,

    /// The rest of the schedule document, carried opaquely.
    #[serde(flatten)]
    pub document: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RotationInfo {
    /// Fallback rotation-day label when today is absent from the calendar map.
    #[serde(default)]
    pub current_day: String,
}

/// An immutable bundle of every knowledge source, loaded as of `loaded_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeSnapshot {
    pub teachers: Vec<Teacher>,
    pub schedule: ScheduleInfo,
    /// Room directory, treated opaquely (serialized into prompts as-is).
    pub rooms: serde_json::Value,
    pub clubs: Vec<Club>,
    /// Sorted ascending by start time.
    pub events: Vec<CalendarEvent>,
    pub handbook: String,
    pub loaded_at: DateTime<Utc>,
}

impl KnowledgeSnapshot {
    /// Look up the rotation-day label for `date`, falling back to the
    /// schedule's `rotation.current_day` when the date has no entry.
    pub fn rotation_day(&self, date: NaiveDate) -> &str {
        let key = date.format("%Y-%m-%d").to_string();
        self.schedule
            .rotation_calendar
            .get(&key)
            .map(String::as_str)
            .unwrap_or(&self.schedule.rotation.current_day)
    }

    /// Events starting at or after `now`, in start order, up to `limit`.
    pub fn upcoming_events(&self, now: DateTime<Utc>, limit: usize) -> Vec<CalendarEvent> {
        self.events
            .iter()
            .filter(|e| e.start >= now)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Directory search: case-insensitive containment over name, subjects,
    /// and email.
    pub fn search_teachers(&self, term: &str) -> Vec<Teacher> {
        let term = term.to_lowercase();
        self.teachers
            .iter()
            .filter(|t| {
                t.name.to_lowercase().contains(&term)
                    || t.subjects.iter().any(|s| s.to_lowercase().contains(&term))
                    || t.email.to_lowercase().contains(&term)
            })
            .cloned()
            .collect()
    }

    /// First club whose name contains `name` (case-insensitive).
    pub fn club_info(&self, name: &str) -> Option<Club> {
        let name = name.to_lowercase();
        self.clubs
            .iter()
            .find(|c| c.name.to_lowercase().contains(&name))
            .cloned()
    }
}

/// The transient result of relevance selection for one query.
///
/// Each field is an independent axis: a single query may populate several
/// categories at once, and any of them may be empty.
#[derive(Debug, Clone, Default)]
pub struct RelevanceSelection {
    pub teachers: Vec<Teacher>,
    pub clubs: Vec<Club>,
    pub events: Vec<CalendarEvent>,
    pub schedule: Option<ScheduleInfo>,
    pub handbook: Option<String>,
}

impl RelevanceSelection {
    /// Audit summary of what was injected, so callers can verify grounding
    /// without re-deriving the selection.
    pub fn summary(&self) -> ContextUsed {
        ContextUsed {
            teachers_count: self.teachers.len(),
            clubs_count: self.clubs.len(),
            events_count: self.events.len(),
            has_schedule: self.schedule.is_some(),
            has_handbook: self.handbook.is_some(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.teachers.is_empty()
            && self.clubs.is_empty()
            && self.events.is_empty()
            && self.schedule.is_none()
            && self.handbook.is_none()
    }
}

/// Per-category counts of facts injected into a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextUsed {
    pub teachers_count: usize,
    pub clubs_count: usize,
    pub events_count: usize,
    pub has_schedule: bool,
    pub has_handbook: bool,
}

/// The relevance strategy seam.
///
/// The default implementation is keyword containment; the trait exists so a
/// ranked or embedding-based matcher can replace it later without touching
/// the prompt assembly contract. Implementations must be pure functions of
/// their inputs — no side effects, no hidden clock reads (`now` is explicit).
pub trait ContextSelector: Send + Sync {
    fn select(
        &self,
        query: &str,
        snapshot: &KnowledgeSnapshot,
        now: DateTime<Utc>,
    ) -> RelevanceSelection;
}
