//! Keyword-based relevance selection.
//!
//! Each knowledge category has its own trigger phrases; a query may fire
//! several categories at once, and a query that fires none gets an empty
//! selection (the model answers from persona alone). A triggered category
//! with no entity match stays empty unless the query contains an explicit
//! broadening phrase ("all teachers", "faculty", "all clubs"), which returns
//! the full set. Matching is literal lowercase containment, deliberately
//! simple and auditable.

use briar_core::{ContextSelector, KnowledgeSnapshot, RelevanceSelection};
use chrono::{DateTime, Utc};
use tracing::debug;

const TEACHER_TRIGGERS: &[&str] = &["teacher", "who teaches"];
const TEACHER_BROADENERS: &[&str] = &["all teachers", "faculty"];
const SCHEDULE_TRIGGERS: &[&str] = &["schedule", "day", "rotation", "period"];
const CLUB_TRIGGERS: &[&str] = &["club", "activity", "extracurricular"];
const CLUB_BROADENERS: &[&str] = &["all clubs"];
const EVENT_TRIGGERS: &[&str] = &["event", "calendar", "what's happening", "coming up"];
const HANDBOOK_TRIGGERS: &[&str] = &["policy", "rule", "handbook", "dress code", "attendance"];

/// The default [`ContextSelector`]: literal keyword containment per category.
pub struct KeywordSelector {
    max_events: usize,
}

impl KeywordSelector {
    pub fn new(max_events: usize) -> Self {
        Self { max_events }
    }
}

impl Default for KeywordSelector {
    fn default() -> Self {
        Self::new(5)
    }
}

fn any_contained(query: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| query.contains(p))
}

impl ContextSelector for KeywordSelector {
    fn select(
        &self,
        query: &str,
        snapshot: &KnowledgeSnapshot,
        now: DateTime<Utc>,
    ) -> RelevanceSelection {
        let query = query.to_lowercase();
        let mut selection = RelevanceSelection::default();

        if any_contained(&query, TEACHER_TRIGGERS) || any_contained(&query, TEACHER_BROADENERS) {
            let matched: Vec<_> = snapshot
                .teachers
                .iter()
                .filter(|t| {
                    // Literal legacy matching: the query must contain a
                    // subject, or the name must contain the whole query.
                    t.name.to_lowercase().contains(&query)
                        || t.subjects
                            .iter()
                            .any(|s| query.contains(&s.to_lowercase()))
                })
                .cloned()
                .collect();
            // The whole directory only on an explicit broadening phrase;
            // a triggered category with no match stays empty.
            selection.teachers = if matched.is_empty() {
                if any_contained(&query, TEACHER_BROADENERS) {
                    snapshot.teachers.clone()
                } else {
                    Vec::new()
                }
            } else {
                matched
            };
        }

        if any_contained(&query, SCHEDULE_TRIGGERS) {
            selection.schedule = Some(snapshot.schedule.clone());
        }

        if any_contained(&query, CLUB_TRIGGERS) || any_contained(&query, CLUB_BROADENERS) {
            let matched: Vec<_> = snapshot
                .clubs
                .iter()
                .filter(|c| {
                    // Same legacy direction: the name or description must
                    // contain the whole query.
                    c.name.to_lowercase().contains(&query)
                        || c.description.to_lowercase().contains(&query)
                })
                .cloned()
                .collect();
            selection.clubs = if matched.is_empty() {
                if any_contained(&query, CLUB_BROADENERS) {
                    snapshot.clubs.clone()
                } else {
                    Vec::new()
                }
            } else {
                matched
            };
        }

        if any_contained(&query, EVENT_TRIGGERS) {
            selection.events = snapshot.upcoming_events(now, self.max_events);
        }

        if any_contained(&query, HANDBOOK_TRIGGERS) {
            selection.handbook = Some(snapshot.handbook.clone());
        }

        debug!(used = ?selection.summary(), "context selected");
        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use briar_core::{CalendarEvent, Club, RotationInfo, ScheduleInfo, Teacher};
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn teacher(name: &str, subject: &str) -> Teacher {
        Teacher {
            name: name.into(),
            subjects: vec![subject.into()],
            email: format!("{}@school.edu", name.to_lowercase().replace(' ', ".")),
            extra: serde_json::Map::new(),
        }
    }

    fn club(name: &str, description: &str) -> Club {
        Club {
            name: name.into(),
            description: description.into(),
            extra: serde_json::Map::new(),
        }
    }

    fn event(summary: &str, y: i32, m: u32, d: u32) -> CalendarEvent {
        let start = Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap();
        CalendarEvent {
            summary: summary.into(),
            description: String::new(),
            start,
            end: start,
            location: String::new(),
        }
    }

    fn snapshot() -> KnowledgeSnapshot {
        KnowledgeSnapshot {
            teachers: vec![
                teacher("Ms. Patel", "Math"),
                teacher("Dr. Okafor", "Chemistry"),
            ],
            schedule: ScheduleInfo {
                rotation_calendar: HashMap::new(),
                rotation: RotationInfo {
                    current_day: "Day 1".into(),
                },
                document: serde_json::Map::new(),
            },
            rooms: serde_json::json!({}),
            clubs: vec![
                club("Robotics Club", "Build and program robots"),
                club("Drama Club", "Home of the improv club and stage productions"),
            ],
            events: vec![
                event("Past Assembly", 2025, 8, 1),
                event("Fall Concert", 2025, 9, 15),
                event("Spirit Week", 2025, 9, 22),
            ],
            handbook: "Dress code: no hats indoors.".into(),
            loaded_at: Utc::now(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn categories_are_independent() {
        let sel =
            KeywordSelector::default().select("What's coming up for all clubs?", &snapshot(), now());
        assert_eq!(sel.clubs.len(), 2);
        assert!(!sel.events.is_empty());
        assert!(sel.teachers.is_empty());
        assert!(sel.schedule.is_none());
        assert!(sel.handbook.is_none());
    }

    #[test]
    fn subject_query_selects_specific_teacher() {
        let sel = KeywordSelector::default().select("Who teaches Chemistry?", &snapshot(), now());
        assert_eq!(sel.teachers.len(), 1);
        assert_eq!(sel.teachers[0].name, "Dr. Okafor");
    }

    #[test]
    fn broadener_selects_whole_directory() {
        let sel = KeywordSelector::default().select("Tell me about the faculty", &snapshot(), now());
        assert_eq!(sel.teachers.len(), 2);
    }

    #[test]
    fn triggered_but_unmatched_without_broadener_is_empty() {
        let sel = KeywordSelector::default().select("who is my teacher?", &snapshot(), now());
        assert!(sel.teachers.is_empty());

        let sel = KeywordSelector::default().select("What clubs can I join?", &snapshot(), now());
        assert!(sel.clubs.is_empty());
    }

    #[test]
    fn specific_club_query_narrows() {
        let sel = KeywordSelector::default().select("robotics club", &snapshot(), now());
        assert_eq!(sel.clubs.len(), 1);
        assert_eq!(sel.clubs[0].name, "Robotics Club");
    }

    #[test]
    fn club_description_containment_matches() {
        let sel = KeywordSelector::default().select("improv club", &snapshot(), now());
        assert_eq!(sel.clubs.len(), 1);
        assert_eq!(sel.clubs[0].name, "Drama Club");
    }

    #[test]
    fn events_exclude_the_past_and_respect_limit() {
        let sel = KeywordSelector::new(1).select("What events are coming up?", &snapshot(), now());
        assert_eq!(sel.events.len(), 1);
        assert_eq!(sel.events[0].summary, "Fall Concert");
    }

    #[test]
    fn schedule_and_handbook_flags() {
        let sel = KeywordSelector::default()
            .select("What day is it in the rotation?", &snapshot(), now());
        assert!(sel.schedule.is_some());

        let sel = KeywordSelector::default().select("What is the dress code?", &snapshot(), now());
        assert!(sel.handbook.is_some());
    }

    #[test]
    fn no_triggers_yields_empty_selection() {
        let sel = KeywordSelector::default().select("Tell me a joke", &snapshot(), now());
        assert!(sel.is_empty());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let sel = KeywordSelector::default().select("WHO TEACHES MATH?", &snapshot(), now());
        assert_eq!(sel.teachers.len(), 1);
        assert_eq!(sel.teachers[0].name, "Ms. Patel");
    }
}
