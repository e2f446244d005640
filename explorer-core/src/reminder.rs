//! The reminder record and the helpers shared by every copy of it.
//!
//! A reminder lives in three places: the local record (authoritative), a
//! task in the user's external task list, and at most one pending
//! notification. The local record's `id` is the key for all three.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

use crate::error::{ExplorerError, ExplorerResult};

/// A reminder as persisted in the local store.
///
/// Field names on disk follow the current record shape (`uuid`, `dueDate`,
/// `eventIdentifier`, ...). Records written in the legacy shape, which lacks
/// completion and mirror linkage, still load with those fields defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    #[serde(rename = "uuid")]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_completed: bool,

    /// Id of the mirrored task, set after the first successful mirror create
    #[serde(
        rename = "eventIdentifier",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub external_event_id: Option<String>,
    /// Task list that holds the mirrored task
    #[serde(
        rename = "calendarIdentifier",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub external_list_id: Option<String>,
}

/// User input for a new reminder.
#[derive(Debug, Clone, Default)]
pub struct NewReminder {
    pub title: String,
    pub notes: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub list: Option<String>,
}

impl NewReminder {
    pub fn new(title: impl Into<String>) -> Self {
        NewReminder {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn due(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn list(mut self, list: impl Into<String>) -> Self {
        self.list = Some(list.into());
        self
    }
}

/// A partial edit. `None` leaves a field alone; `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct ReminderChanges {
    pub title: Option<String>,
    pub notes: Option<Option<String>>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub list: Option<Option<String>>,
}

impl ReminderChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.notes.is_none() && self.due_date.is_none() && self.list.is_none()
    }

    /// Apply the changes to a copy of `reminder`.
    pub fn apply(&self, reminder: &Reminder) -> ExplorerResult<Reminder> {
        let mut updated = reminder.clone();

        if let Some(title) = &self.title {
            updated.title = validate_title(title)?;
        }
        if let Some(notes) = &self.notes {
            updated.notes = normalize_notes(notes.clone());
        }
        if let Some(due_date) = self.due_date {
            updated.due_date = due_date;
        }
        if let Some(list) = &self.list {
            updated.list = list.clone();
        }

        Ok(updated)
    }
}

impl Reminder {
    /// Build a fresh record: the id is generated first, then the user fields.
    pub fn create(new: NewReminder) -> ExplorerResult<Self> {
        let id = Uuid::new_v4().to_string();
        let title = validate_title(&new.title)?;

        Ok(Reminder {
            id,
            title,
            notes: normalize_notes(new.notes),
            due_date: new.due_date,
            list: new.list,
            created_at: Utc::now(),
            is_completed: false,
            external_event_id: None,
            external_list_id: None,
        })
    }

    /// The marker embedded in mirrored notes.
    pub fn correlation_tag(&self) -> String {
        correlation_tag(&self.id)
    }

    /// Notes as written to the mirrored task: tag first, then user notes.
    pub fn tagged_notes(&self) -> String {
        match &self.notes {
            Some(notes) => format!("{}\n{}", self.correlation_tag(), notes),
            None => self.correlation_tag(),
        }
    }

    /// Whether a notification should be pending for this reminder at `now`.
    pub fn wants_notification(&self, now: DateTime<Utc>) -> bool {
        !self.is_completed && self.due_date.is_some_and(|due| due > now)
    }

    /// Which agenda section the reminder falls in, judged in `now`'s timezone.
    pub fn section<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Section {
        if self.is_completed {
            return Section::Done;
        }

        let Some(due) = self.due_date else {
            return Section::Unscheduled;
        };

        let due_day = due.with_timezone(&now.timezone()).date_naive();
        let today = now.date_naive();

        match due_day.cmp(&today) {
            Ordering::Less => Section::Overdue,
            Ordering::Equal => Section::Today,
            Ordering::Greater => Section::Scheduled,
        }
    }
}

impl fmt::Display for Reminder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Agenda grouping used when listing reminders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Overdue,
    Today,
    Scheduled,
    Unscheduled,
    Done,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Overdue,
        Section::Today,
        Section::Scheduled,
        Section::Unscheduled,
        Section::Done,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Section::Overdue => "Overdue",
            Section::Today => "Today",
            Section::Scheduled => "Scheduled",
            Section::Unscheduled => "No date",
            Section::Done => "Completed",
        }
    }
}

// =============================================================================
// Correlation tag
// =============================================================================

const TAG_PREFIX: &str = "[uuid:";

pub fn correlation_tag(id: &str) -> String {
    format!("{TAG_PREFIX}{id}]")
}

/// Split mirrored notes into the embedded reminder id and the user's notes.
pub fn parse_tagged_notes(notes: &str) -> (Option<String>, Option<String>) {
    let Some(rest) = notes.strip_prefix(TAG_PREFIX) else {
        return (None, normalize_notes(Some(notes.to_string())));
    };
    let Some(end) = rest.find(']') else {
        return (None, normalize_notes(Some(notes.to_string())));
    };

    let id = rest[..end].to_string();
    let remainder = rest[end + 1..].strip_prefix('\n').unwrap_or(&rest[end + 1..]);

    (Some(id), normalize_notes(Some(remainder.to_string())))
}

// =============================================================================
// Ordering
// =============================================================================

/// Ascending due date; undated reminders last; ties by creation time, then id.
pub fn by_due_date(a: &Reminder, b: &Reminder) -> Ordering {
    let due = match (a.due_date, b.due_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    due.then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

fn validate_title(title: &str) -> ExplorerResult<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ExplorerError::Validation("title must not be empty".into()));
    }
    Ok(trimmed.to_string())
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes.filter(|n| !n.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn make_reminder(title: &str) -> Reminder {
        Reminder::create(NewReminder::new(title)).unwrap()
    }

    #[test]
    fn create_assigns_unique_ids() {
        let a = make_reminder("Buy milk");
        let b = make_reminder("Buy milk");
        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
        assert!(!a.is_completed);
        assert!(a.external_event_id.is_none());
    }

    #[test]
    fn create_rejects_blank_title() {
        let err = Reminder::create(NewReminder::new("   ")).unwrap_err();
        assert!(matches!(err, ExplorerError::Validation(_)));
    }

    #[test]
    fn create_trims_title_and_drops_empty_notes() {
        let r = Reminder::create(NewReminder::new("  Pack bags ").notes("  ")).unwrap();
        assert_eq!(r.title, "Pack bags");
        assert_eq!(r.notes, None);
    }

    #[test]
    fn tagged_notes_without_notes_is_just_the_tag() {
        let r = make_reminder("Call hotel");
        assert_eq!(r.tagged_notes(), format!("[uuid:{}]", r.id));
    }

    #[test]
    fn tagged_notes_parse_back() {
        let mut r = make_reminder("Call hotel");
        r.notes = Some("ask about late checkout\nroom 12".into());

        let (id, notes) = parse_tagged_notes(&r.tagged_notes());
        assert_eq!(id.as_deref(), Some(r.id.as_str()));
        assert_eq!(notes, r.notes);
    }

    #[test]
    fn untagged_notes_have_no_id() {
        let (id, notes) = parse_tagged_notes("just a note");
        assert_eq!(id, None);
        assert_eq!(notes.as_deref(), Some("just a note"));

        let (id, _) = parse_tagged_notes("[uuid:unterminated");
        assert_eq!(id, None);
    }

    #[test]
    fn changes_clear_and_set_fields() {
        let mut r = make_reminder("Book flight");
        r.notes = Some("window seat".into());
        r.list = Some("Trip".into());

        let due = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let changes = ReminderChanges {
            title: Some("Book return flight".into()),
            notes: Some(None),
            due_date: Some(Some(due)),
            list: None,
        };

        let updated = changes.apply(&r).unwrap();
        assert_eq!(updated.id, r.id);
        assert_eq!(updated.created_at, r.created_at);
        assert_eq!(updated.title, "Book return flight");
        assert_eq!(updated.notes, None);
        assert_eq!(updated.due_date, Some(due));
        assert_eq!(updated.list.as_deref(), Some("Trip"));
    }

    #[test]
    fn changes_reject_blank_title() {
        let r = make_reminder("Book flight");
        let changes = ReminderChanges {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(changes.apply(&r).is_err());
    }

    #[test]
    fn by_due_date_puts_undated_last() {
        let base = Utc.with_ymd_and_hms(2025, 3, 20, 15, 0, 0).unwrap();
        let mut later = make_reminder("later");
        later.due_date = Some(base + Duration::hours(2));
        let mut sooner = make_reminder("sooner");
        sooner.due_date = Some(base);
        let undated = make_reminder("undated");

        let mut all = vec![undated.clone(), later.clone(), sooner.clone()];
        all.sort_by(by_due_date);

        let titles: Vec<_> = all.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["sooner", "later", "undated"]);
    }

    #[test]
    fn section_follows_due_day() {
        let now = Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap();
        let mut r = make_reminder("x");

        assert_eq!(r.section(&now), Section::Unscheduled);

        r.due_date = Some(Utc.with_ymd_and_hms(2025, 3, 20, 23, 0, 0).unwrap());
        assert_eq!(r.section(&now), Section::Today);

        r.due_date = Some(Utc.with_ymd_and_hms(2025, 3, 21, 0, 30, 0).unwrap());
        assert_eq!(r.section(&now), Section::Scheduled);

        r.due_date = Some(Utc.with_ymd_and_hms(2025, 3, 19, 8, 0, 0).unwrap());
        assert_eq!(r.section(&now), Section::Overdue);

        r.is_completed = true;
        assert_eq!(r.section(&now), Section::Done);
    }

    #[test]
    fn wants_notification_only_for_open_future_reminders() {
        let now = Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap();
        let mut r = make_reminder("x");
        assert!(!r.wants_notification(now));

        r.due_date = Some(now + Duration::minutes(5));
        assert!(r.wants_notification(now));

        r.is_completed = true;
        assert!(!r.wants_notification(now));

        r.is_completed = false;
        r.due_date = Some(now - Duration::minutes(5));
        assert!(!r.wants_notification(now));
    }
}
