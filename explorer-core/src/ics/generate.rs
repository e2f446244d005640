//! VTODO generation.

use chrono::{DateTime, Utc};
use icalendar::{Alarm, Calendar, Component, EventLike, Property, Trigger, ValueType};

use super::UTC_FORMAT;
use crate::mirror::MirrorTask;

/// Generate .ics content for a task.
///
/// `stamp` is written as DTSTAMP and, for completed tasks, COMPLETED.
pub fn generate_todo(uid: &str, task: &MirrorTask, stamp: DateTime<Utc>) -> String {
    let mut cal = Calendar::new();

    let mut todo = icalendar::Todo::new();
    todo.uid(uid);
    todo.summary(&task.title);
    todo.add_property("DTSTAMP", stamp.format(UTC_FORMAT).to_string());

    if !task.notes.is_empty() {
        todo.description(&task.notes);
    }

    if task.completed {
        todo.add_property("STATUS", "COMPLETED");
        todo.add_property("COMPLETED", stamp.format(UTC_FORMAT).to_string());
    } else {
        todo.add_property("STATUS", "NEEDS-ACTION");
    }

    if let Some(due) = task.due {
        todo.add_property("DUE", due.format(UTC_FORMAT).to_string());
        todo.alarm(alarm_at(due));
    }

    cal.push(todo.done());
    strip_ics_bloat(&cal.done().to_string())
}

/// A display alarm that fires at an absolute instant.
fn alarm_at(at: DateTime<Utc>) -> Alarm {
    let mut alarm = Alarm::display("Reminder", Trigger::before_start(chrono::Duration::zero()));

    let mut trigger = Property::new("TRIGGER", at.format(UTC_FORMAT).to_string());
    trigger.append_parameter(ValueType::DateTime);
    alarm.append_property(trigger);

    alarm
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with EXPLORER
/// - Remove CALSCALE:GREGORIAN (it's the default)
/// - Remove DTSTAMP and UID inside VALARM sections
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());
    let mut in_valarm = false;

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:EXPLORER\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        if line == "BEGIN:VALARM" {
            in_valarm = true;
        } else if line == "END:VALARM" {
            in_valarm = false;
        }

        if in_valarm && (line.starts_with("DTSTAMP:") || line.starts_with("UID:")) {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}
