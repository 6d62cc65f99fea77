//! Minimal iCalendar decoder for the institutional events feed.
//!
//! Handles the subset real calendar exports use: folded lines, property
//! parameters, text escapes, and the three DTSTART/DTEND timestamp forms
//! (UTC `...Z`, floating local, and all-day `VALUE=DATE`). Floating times
//! and date-only values are normalized to UTC so every event carries a
//! concrete instant.

use briar_core::{CalendarEvent, KnowledgeError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const SOURCE: &str = "calendar.ics";

/// Decode every VEVENT in `input`, sorted ascending by start time.
///
/// Any malformed event fails the whole decode. The knowledge store treats a
/// snapshot as all-or-nothing, so a partial event list never reaches prompts.
pub fn parse_events(input: &str) -> Result<Vec<CalendarEvent>, KnowledgeError> {
    let mut events = Vec::new();
    let mut current: Option<EventBuilder> = None;

    for line in unfold_lines(input) {
        let Some((name, params, value)) = split_property(&line) else {
            continue;
        };

        match name.as_str() {
            "BEGIN" if value.eq_ignore_ascii_case("VEVENT") => {
                if current.is_some() {
                    return Err(KnowledgeError::parse(SOURCE, "nested BEGIN:VEVENT"));
                }
                current = Some(EventBuilder::default());
            }
            "END" if value.eq_ignore_ascii_case("VEVENT") => {
                let builder = current
                    .take()
                    .ok_or_else(|| KnowledgeError::parse(SOURCE, "END:VEVENT without BEGIN"))?;
                events.push(builder.build()?);
            }
            _ => {
                if let Some(builder) = current.as_mut() {
                    builder.set(&name, &params, value)?;
                }
            }
        }
    }

    if current.is_some() {
        return Err(KnowledgeError::parse(SOURCE, "unterminated VEVENT"));
    }

    events.sort_by_key(|e| e.start);
    Ok(events)
}

/// Join folded lines: a line starting with a space or tab continues the
/// previous one (RFC 5545 §3.1).
fn unfold_lines(input: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in input.lines() {
        let raw = raw.trim_end_matches('\r');
        if let Some(rest) = raw.strip_prefix(' ').or_else(|| raw.strip_prefix('\t')) {
            if let Some(last) = lines.last_mut() {
                last.push_str(rest);
                continue;
            }
        }
        lines.push(raw.to_string());
    }
    lines
}

/// Split `NAME;PARAM=V;PARAM=V:value` into (name, params, value).
fn split_property(line: &str) -> Option<(String, Vec<(String, String)>, String)> {
    let (head, value) = line.split_once(':')?;
    let mut parts = head.split(';');
    let name = parts.next()?.trim().to_ascii_uppercase();
    if name.is_empty() {
        return None;
    }
    let params = parts
        .filter_map(|p| {
            let (k, v) = p.split_once('=')?;
            Some((k.trim().to_ascii_uppercase(), v.trim().to_string()))
        })
        .collect();
    Some((name, params, value.to_string()))
}

/// Undo iCalendar text escaping.
fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(',') => out.push(','),
            Some(';') => out.push(';'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Decode a DTSTART/DTEND value into a UTC instant.
///
/// Forms accepted:
/// - `YYYYMMDDTHHMMSSZ`: explicit UTC
/// - `YYYYMMDDTHHMMSS`: floating time, read as UTC
/// - `YYYYMMDD` (with `VALUE=DATE`): midnight UTC
fn parse_timestamp(
    value: &str,
    params: &[(String, String)],
) -> Result<DateTime<Utc>, KnowledgeError> {
    let value = value.trim();
    let is_date = params
        .iter()
        .any(|(k, v)| k == "VALUE" && v.eq_ignore_ascii_case("DATE"));

    if is_date || (value.len() == 8 && !value.contains('T')) {
        let date = NaiveDate::parse_from_str(value, "%Y%m%d").map_err(|_| {
            KnowledgeError::parse(SOURCE, format!("invalid date value: {value}"))
        })?;
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| KnowledgeError::parse(SOURCE, format!("invalid date value: {value}")))?;
        return Ok(midnight.and_utc());
    }

    let naive_part = value.strip_suffix('Z').unwrap_or(value);
    let naive = NaiveDateTime::parse_from_str(naive_part, "%Y%m%dT%H%M%S").map_err(|_| {
        KnowledgeError::parse(SOURCE, format!("invalid timestamp value: {value}"))
    })?;
    Ok(naive.and_utc())
}

#[derive(Default)]
struct EventBuilder {
    summary: Option<String>,
    description: Option<String>,
    location: Option<String>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl EventBuilder {
    fn set(
        &mut self,
        name: &str,
        params: &[(String, String)],
        value: String,
    ) -> Result<(), KnowledgeError> {
        match name {
            "SUMMARY" => self.summary = Some(unescape_text(&value)),
            "DESCRIPTION" => self.description = Some(unescape_text(&value)),
            "LOCATION" => self.location = Some(unescape_text(&value)),
            "DTSTART" => self.start = Some(parse_timestamp(&value, params)?),
            "DTEND" => self.end = Some(parse_timestamp(&value, params)?),
            _ => {}
        }
        Ok(())
    }

    fn build(self) -> Result<CalendarEvent, KnowledgeError> {
        let start = self
            .start
            .ok_or_else(|| KnowledgeError::parse(SOURCE, "VEVENT missing DTSTART"))?;
        // Events without DTEND are treated as instantaneous.
        let end = self.end.unwrap_or(start);
        if start > end {
            return Err(KnowledgeError::parse(
                SOURCE,
                format!("VEVENT ends before it starts ({start} > {end})"),
            ));
        }
        Ok(CalendarEvent {
            summary: self.summary.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            start,
            end,
            location: self.location.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_basic_utc_event() {
        let ics = "BEGIN:VCALENDAR\r\n\
            BEGIN:VEVENT\r\n\
            SUMMARY:Fall Concert\r\n\
            LOCATION:Auditorium\r\n\
            DTSTART:20250915T190000Z\r\n\
            DTEND:20250915T210000Z\r\n\
            END:VEVENT\r\n\
            END:VCALENDAR\r\n";
        let events = parse_events(ics).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Fall Concert");
        assert_eq!(events[0].location, "Auditorium");
        assert_eq!(
            events[0].start,
            Utc.with_ymd_and_hms(2025, 9, 15, 19, 0, 0).unwrap()
        );
    }

    #[test]
    fn floating_time_read_as_utc() {
        let ics = "BEGIN:VEVENT\nSUMMARY:Assembly\nDTSTART:20250901T081500\nEND:VEVENT\n";
        let events = parse_events(ics).unwrap();
        assert_eq!(
            events[0].start,
            Utc.with_ymd_and_hms(2025, 9, 1, 8, 15, 0).unwrap()
        );
    }

    #[test]
    fn all_day_event_is_midnight_utc() {
        let ics =
            "BEGIN:VEVENT\nSUMMARY:No School\nDTSTART;VALUE=DATE:20251127\nEND:VEVENT\n";
        let events = parse_events(ics).unwrap();
        assert_eq!(
            events[0].start,
            Utc.with_ymd_and_hms(2025, 11, 27, 0, 0, 0).unwrap()
        );
        assert_eq!(events[0].end, events[0].start);
    }

    #[test]
    fn missing_dtend_defaults_to_start() {
        let ics = "BEGIN:VEVENT\nSUMMARY:Bell\nDTSTART:20250901T080000Z\nEND:VEVENT\n";
        let events = parse_events(ics).unwrap();
        assert_eq!(events[0].end, events[0].start);
    }

    #[test]
    fn folded_summary_is_joined() {
        let ics = "BEGIN:VEVENT\r\n\
            SUMMARY:Parent Teacher\r\n \
            Conferences\r\n\
            DTSTART:20251010T160000Z\r\n\
            END:VEVENT\r\n";
        let events = parse_events(ics).unwrap();
        assert_eq!(events[0].summary, "Parent TeacherConferences");
    }

    #[test]
    fn text_escapes_unescaped() {
        let ics = "BEGIN:VEVENT\nSUMMARY:Clubs\\, Sports\\; more\\nSecond line\nDTSTART:20250901T080000Z\nEND:VEVENT\n";
        let events = parse_events(ics).unwrap();
        assert_eq!(events[0].summary, "Clubs, Sports; more\nSecond line");
    }

    #[test]
    fn events_sorted_by_start() {
        let ics = "BEGIN:VEVENT\nSUMMARY:Later\nDTSTART:20251001T090000Z\nEND:VEVENT\n\
            BEGIN:VEVENT\nSUMMARY:Earlier\nDTSTART:20250901T090000Z\nEND:VEVENT\n";
        let events = parse_events(ics).unwrap();
        assert_eq!(events[0].summary, "Earlier");
        assert_eq!(events[1].summary, "Later");
    }

    #[test]
    fn missing_dtstart_is_error() {
        let ics = "BEGIN:VEVENT\nSUMMARY:Broken\nEND:VEVENT\n";
        assert!(parse_events(ics).is_err());
    }

    #[test]
    fn end_before_start_is_error() {
        let ics = "BEGIN:VEVENT\nSUMMARY:Backwards\nDTSTART:20250902T090000Z\nDTEND:20250901T090000Z\nEND:VEVENT\n";
        assert!(parse_events(ics).is_err());
    }

    #[test]
    fn unterminated_event_is_error() {
        let ics = "BEGIN:VEVENT\nSUMMARY:Open\nDTSTART:20250901T090000Z\n";
        assert!(parse_events(ics).is_err());
    }

    #[test]
    fn garbage_timestamp_is_error() {
        let ics = "BEGIN:VEVENT\nSUMMARY:Bad\nDTSTART:not-a-date\nEND:VEVENT\n";
        assert!(parse_events(ics).is_err());
    }

    #[test]
    fn unknown_properties_ignored() {
        let ics = "BEGIN:VEVENT\nUID:abc-123\nSEQUENCE:0\nSUMMARY:Ok\nDTSTART:20250901T090000Z\nEND:VEVENT\n";
        let events = parse_events(ics).unwrap();
        assert_eq!(events[0].summary, "Ok");
    }

    #[test]
    fn empty_feed_yields_no_events() {
        let events = parse_events("BEGIN:VCALENDAR\nEND:VCALENDAR\n").unwrap();
        assert!(events.is_empty());
    }
}
