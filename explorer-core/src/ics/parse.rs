//! VTODO parsing using the icalendar crate's parser.

use chrono::{DateTime, NaiveDateTime, Utc};
use icalendar::parser::{Property, read_calendar, unfold};

use super::UTC_FORMAT;
use crate::mirror::MirrorTask;

/// A task read back from an .ics file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTodo {
    pub uid: String,
    pub task: MirrorTask,
    /// Absolute alarm instants, in file order
    pub alarms: Vec<DateTime<Utc>>,
}

/// Parse the first VTODO in `content`.
pub fn parse_todo(content: &str) -> Option<ParsedTodo> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).ok()?;
    let vtodo = calendar.components.iter().find(|c| c.name == "VTODO")?;

    let uid = vtodo.find_prop("UID")?.val.to_string();
    let title = vtodo
        .find_prop("SUMMARY")
        .map(|p| unescape_ics_value(p.val.as_ref()))
        .unwrap_or_else(|| "(No title)".to_string());
    let notes = vtodo
        .find_prop("DESCRIPTION")
        .map(|p| unescape_ics_value(p.val.as_ref()))
        .unwrap_or_default();
    let due = vtodo.find_prop("DUE").and_then(parse_datetime);
    let completed = vtodo
        .find_prop("STATUS")
        .is_some_and(|p| p.val.as_ref() == "COMPLETED");

    let alarms = vtodo
        .components
        .iter()
        .filter(|c| c.name == "VALARM")
        .filter_map(|alarm| parse_datetime(alarm.find_prop("TRIGGER")?))
        .collect();

    Some(ParsedTodo {
        uid,
        task: MirrorTask {
            title,
            notes,
            due,
            completed,
        },
        alarms,
    })
}

/// Read a UTC, floating or date-only value. Relative triggers yield `None`.
fn parse_datetime(prop: &Property) -> Option<DateTime<Utc>> {
    let val = prop.val.as_ref().trim();

    if val.ends_with('Z') {
        return NaiveDateTime::parse_from_str(val, UTC_FORMAT)
            .ok()
            .map(|dt| dt.and_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(val, "%Y%m%dT%H%M%S") {
        return Some(dt.and_utc());
    }
    chrono::NaiveDate::parse_from_str(val, "%Y%m%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Unescape ICS text values per RFC 5545
fn unescape_ics_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.peek() {
            Some(',') | Some(';') | Some('\\') => {
                result.extend(chars.next());
            }
            Some('n') | Some('N') => {
                result.push('\n');
                chars.next();
            }
            _ => result.push(c),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ics::generate_todo;
    use chrono::TimeZone;

    #[test]
    fn reads_generated_todo() {
        let due = Utc.with_ymd_and_hms(2026, 3, 20, 9, 0, 0).unwrap();
        let task = MirrorTask {
            title: "Buy milk".into(),
            notes: "[uuid:abc]\nsemi-skimmed, 2 litres".into(),
            due: Some(due),
            completed: false,
        };
        let ics = generate_todo("abc", &task, Utc::now());

        let parsed = parse_todo(&ics).unwrap();
        assert_eq!(parsed.uid, "abc");
        assert_eq!(parsed.task, task);
        assert_eq!(parsed.alarms, vec![due]);
    }

    #[test]
    fn reads_foreign_todo_with_relative_alarm() {
        let ics = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Other//EN\r\n\
BEGIN:VTODO\r\n\
UID:foreign-1\r\n\
SUMMARY:File taxes\r\n\
DUE;VALUE=DATE:20260415\r\n\
STATUS:COMPLETED\r\n\
BEGIN:VALARM\r\n\
ACTION:DISPLAY\r\n\
DESCRIPTION:Reminder\r\n\
TRIGGER:-PT15M\r\n\
END:VALARM\r\n\
END:VTODO\r\n\
END:VCALENDAR\r\n";

        let parsed = parse_todo(ics).unwrap();
        assert_eq!(parsed.task.title, "File taxes");
        assert_eq!(
            parsed.task.due,
            Some(Utc.with_ymd_and_hms(2026, 4, 15, 0, 0, 0).unwrap())
        );
        assert!(parsed.task.completed);
        assert!(parsed.task.notes.is_empty());
        assert!(parsed.alarms.is_empty());
    }

    #[test]
    fn rejects_content_without_vtodo() {
        let ics = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nEND:VCALENDAR\r\n";
        assert!(parse_todo(ics).is_none());
    }

    #[test]
    fn unescapes_text() {
        assert_eq!(unescape_ics_value(r"a\, b\; c\\d\ne"), "a, b; c\\d\ne");
    }
}
