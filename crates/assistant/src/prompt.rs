//! System prompt assembly.
//!
//! The prompt is built from blocks in a fixed order: persona, today's date
//! and rotation day, the mode directive, the selected knowledge categories,
//! then the student's personal context. Empty categories produce no block
//! at all, so the model never sees headers with nothing under them.

use briar_core::{KnowledgeSnapshot, PersonalContext, RelevanceSelection, Result};
use chrono::{DateTime, Utc};

use crate::persona::{persona, ChatMode};

const PERSONAL_BEGIN: &str = "--- STUDENT CONTEXT ---";
const PERSONAL_END: &str = "--- END STUDENT CONTEXT ---";

/// Compose the full system prompt for one request.
pub fn build_system_prompt(
    mode: ChatMode,
    selection: &RelevanceSelection,
    snapshot: &KnowledgeSnapshot,
    personal: &PersonalContext,
    now: DateTime<Utc>,
) -> Result<String> {
    let mut blocks: Vec<String> = vec![persona().to_string()];

    blocks.push(format!(
        "Today is {}. Rotation day: {}.",
        now.format("%A, %B %-d, %Y"),
        snapshot.rotation_day(now.date_naive()),
    ));

    blocks.push(mode.directive().to_string());

    if !selection.teachers.is_empty() {
        blocks.push(format!(
            "## Teachers\n{}",
            serde_json::to_string_pretty(&selection.teachers)?
        ));
    }

    if let Some(schedule) = &selection.schedule {
        blocks.push(format!(
            "## Schedule\n{}",
            serde_json::to_string_pretty(schedule)?
        ));
    }

    if !selection.clubs.is_empty() {
        blocks.push(format!(
            "## Clubs\n{}",
            serde_json::to_string_pretty(&selection.clubs)?
        ));
    }

    if !selection.events.is_empty() {
        let lines: Vec<String> = selection
            .events
            .iter()
            .map(|e| {
                let mut line = format!("- {} ({})", e.summary, e.start.format("%Y-%m-%d %H:%M UTC"));
                if !e.location.is_empty() {
                    line.push_str(&format!(" at {}", e.location));
                }
                line
            })
            .collect();
        blocks.push(format!("## Upcoming events\n{}", lines.join("\n")));
    }

    if let Some(handbook) = &selection.handbook {
        blocks.push(format!("## Handbook\n{handbook}"));
    }

    if has_personal_content(personal) {
        blocks.push(format!(
            "{PERSONAL_BEGIN}\n{}\n{PERSONAL_END}",
            serde_json::to_string_pretty(personal)?
        ));
    }

    Ok(blocks.join("\n\n"))
}

fn has_personal_content(personal: &PersonalContext) -> bool {
    !personal.profile.name.is_empty()
        || !personal.profile.grade.is_empty()
        || !personal.profile.interests.is_empty()
        || !personal.profile.preferences.notes.is_empty()
        || !personal.profile.schedule.is_empty()
        || !personal.todos.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use briar_core::{RotationInfo, ScheduleInfo, StudentProfile, Teacher, TodoItem};
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn snapshot() -> KnowledgeSnapshot {
        let mut rotation_calendar = HashMap::new();
        rotation_calendar.insert("2025-09-08".to_string(), "Day 4".to_string());
        KnowledgeSnapshot {
            teachers: vec![],
            schedule: ScheduleInfo {
                rotation_calendar,
                rotation: RotationInfo {
                    current_day: "Day 1".into(),
                },
                document: serde_json::Map::new(),
            },
            rooms: serde_json::json!({}),
            clubs: vec![],
            events: vec![],
            handbook: String::new(),
            loaded_at: Utc::now(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 8, 14, 0, 0).unwrap()
    }

    #[test]
    fn empty_selection_has_no_knowledge_headers() {
        let prompt = build_system_prompt(
            ChatMode::Quick,
            &RelevanceSelection::default(),
            &snapshot(),
            &PersonalContext::default(),
            now(),
        )
        .unwrap();

        assert!(!prompt.contains("## Teachers"));
        assert!(!prompt.contains("## Clubs"));
        assert!(!prompt.contains(PERSONAL_BEGIN));
        assert!(prompt.contains("You are Briar"));
    }

    #[test]
    fn date_line_uses_rotation_calendar() {
        let prompt = build_system_prompt(
            ChatMode::Quick,
            &RelevanceSelection::default(),
            &snapshot(),
            &PersonalContext::default(),
            now(),
        )
        .unwrap();

        assert!(prompt.contains("Monday, September 8, 2025"));
        assert!(prompt.contains("Rotation day: Day 4"));
    }

    #[test]
    fn selected_teachers_appear_in_a_block() {
        let selection = RelevanceSelection {
            teachers: vec![Teacher {
                name: "Dr. Okafor".into(),
                subjects: vec!["Chemistry".into()],
                email: "okafor@school.edu".into(),
                extra: serde_json::Map::new(),
            }],
            ..RelevanceSelection::default()
        };
        let prompt = build_system_prompt(
            ChatMode::Info,
            &selection,
            &snapshot(),
            &PersonalContext::default(),
            now(),
        )
        .unwrap();

        assert!(prompt.contains("## Teachers"));
        assert!(prompt.contains("Dr. Okafor"));
    }

    #[test]
    fn personal_context_is_delimited() {
        let personal = PersonalContext {
            profile: StudentProfile {
                name: "Alice".into(),
                ..StudentProfile::default()
            },
            todos: vec![TodoItem::new("finish essay")],
        };
        let prompt = build_system_prompt(
            ChatMode::Quick,
            &RelevanceSelection::default(),
            &snapshot(),
            &personal,
            now(),
        )
        .unwrap();

        let begin = prompt.find(PERSONAL_BEGIN).unwrap();
        let end = prompt.find(PERSONAL_END).unwrap();
        assert!(begin < end);
        let inner = &prompt[begin..end];
        assert!(inner.contains("Alice"));
        assert!(inner.contains("finish essay"));
    }

    #[test]
    fn mode_directive_follows_persona_before_context() {
        let selection = RelevanceSelection {
            handbook: Some("No hats indoors.".into()),
            ..RelevanceSelection::default()
        };
        let prompt = build_system_prompt(
            ChatMode::Guide,
            &selection,
            &snapshot(),
            &PersonalContext::default(),
            now(),
        )
        .unwrap();

        let directive = prompt.find(ChatMode::Guide.directive()).unwrap();
        let persona_at = prompt.find("You are Briar").unwrap();
        let handbook_at = prompt.find("## Handbook").unwrap();
        assert!(persona_at < directive);
        assert!(directive < handbook_at);
    }
}
