//! The external task-list mirror.
//!
//! Each reminder is mirrored as a task in a list the user owns outside
//! Explorer (a system reminders app, a CalDAV task list, a directory of
//! VTODO files). The mirror is write-mostly: Explorer only reads back by
//! task id, or by correlation tag when the id was never persisted.

pub mod protocol;
pub mod provider;
pub mod remote;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ExplorerError;
use crate::reminder::Reminder;

/// A task as sent to the mirror.
///
/// A task carries at most one alarm, at its due date. Writing a task
/// replaces every alarm it had before.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirrorTask {
    pub title: String,
    /// User notes prefixed with the reminder's correlation tag
    pub notes: String,
    pub due: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
}

impl From<&Reminder> for MirrorTask {
    fn from(reminder: &Reminder) -> Self {
        MirrorTask {
            title: reminder.title.clone(),
            notes: reminder.tagged_notes(),
            due: reminder.due_date,
            completed: reminder.is_completed,
        }
    }
}

/// A destination list in the mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskList {
    pub id: String,
    pub title: String,
    pub writable: bool,
    #[serde(default)]
    pub is_default: bool,
}

/// A task located through its correlation tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundTask {
    pub task_id: String,
    pub list_id: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MirrorError {
    #[error("Access to the task list was denied")]
    AccessDenied,

    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Failed(String),
}

impl From<ExplorerError> for MirrorError {
    fn from(error: ExplorerError) -> Self {
        match error {
            ExplorerError::RemoteNotFound(id) => MirrorError::NotFound(id),
            other => MirrorError::Failed(other.to_string()),
        }
    }
}

pub type MirrorResult<T> = Result<T, MirrorError>;

/// Capabilities required from the external task store.
#[async_trait]
pub trait TaskMirror: Send + Sync {
    /// Ask for (or confirm) permission to write tasks.
    async fn request_access(&self) -> MirrorResult<bool>;

    async fn lists(&self) -> MirrorResult<Vec<TaskList>>;

    /// Create a task in `list_id`, returning its id.
    async fn create_task(&self, list_id: &str, task: &MirrorTask) -> MirrorResult<String>;

    async fn update_task(&self, task_id: &str, task: &MirrorTask) -> MirrorResult<()>;

    async fn delete_task(&self, task_id: &str) -> MirrorResult<()>;

    /// Fallback lookup: find a task whose notes carry `tag`.
    async fn find_task_by_tag(&self, tag: &str) -> MirrorResult<Option<FoundTask>>;

    async fn set_completion(&self, task_id: &str, completed: bool) -> MirrorResult<()>;
}

/// Mirror used when no task list is configured: access is never granted.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMirror;

#[async_trait]
impl TaskMirror for NoMirror {
    async fn request_access(&self) -> MirrorResult<bool> {
        Ok(false)
    }

    async fn lists(&self) -> MirrorResult<Vec<TaskList>> {
        Ok(Vec::new())
    }

    async fn create_task(&self, _list_id: &str, _task: &MirrorTask) -> MirrorResult<String> {
        Err(MirrorError::AccessDenied)
    }

    async fn update_task(&self, _task_id: &str, _task: &MirrorTask) -> MirrorResult<()> {
        Err(MirrorError::AccessDenied)
    }

    async fn delete_task(&self, _task_id: &str) -> MirrorResult<()> {
        Err(MirrorError::AccessDenied)
    }

    async fn find_task_by_tag(&self, _tag: &str) -> MirrorResult<Option<FoundTask>> {
        Ok(None)
    }

    async fn set_completion(&self, _task_id: &str, _completed: bool) -> MirrorResult<()> {
        Err(MirrorError::AccessDenied)
    }
}

/// Pick where a new task goes.
///
/// Order: the configured list (if writable), a writable list titled like the
/// reminder's label, the store's default list (if writable), the first
/// writable list.
pub fn choose_destination<'a>(
    lists: &'a [TaskList],
    configured: Option<&str>,
    label: Option<&str>,
) -> Option<&'a TaskList> {
    let writable = || lists.iter().filter(|l| l.writable);

    configured
        .and_then(|id| writable().find(|l| l.id == id))
        .or_else(|| label.and_then(|label| writable().find(|l| l.title.eq_ignore_ascii_case(label))))
        .or_else(|| writable().find(|l| l.is_default))
        .or_else(|| writable().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::NewReminder;

    fn list(id: &str, title: &str, writable: bool, is_default: bool) -> TaskList {
        TaskList {
            id: id.into(),
            title: title.into(),
            writable,
            is_default,
        }
    }

    #[test]
    fn destination_prefers_configured_list() {
        let lists = vec![
            list("a", "Inbox", true, true),
            list("b", "Travel", true, false),
        ];
        let chosen = choose_destination(&lists, Some("b"), None).unwrap();
        assert_eq!(chosen.id, "b");
    }

    #[test]
    fn destination_skips_read_only_configured_list() {
        let lists = vec![
            list("a", "Inbox", true, true),
            list("b", "Shared", false, false),
        ];
        let chosen = choose_destination(&lists, Some("b"), None).unwrap();
        assert_eq!(chosen.id, "a");
    }

    #[test]
    fn destination_matches_label_then_default() {
        let lists = vec![
            list("a", "Inbox", true, false),
            list("b", "Reminders", true, true),
            list("c", "travel", true, false),
        ];
        assert_eq!(choose_destination(&lists, None, Some("Travel")).unwrap().id, "c");
        assert_eq!(choose_destination(&lists, None, Some("Groceries")).unwrap().id, "b");
    }

    #[test]
    fn destination_falls_back_to_first_writable() {
        let lists = vec![
            list("a", "Birthdays", false, true),
            list("b", "Inbox", true, false),
        ];
        assert_eq!(choose_destination(&lists, None, None).unwrap().id, "b");
    }

    #[test]
    fn no_writable_list_means_no_destination() {
        let lists = vec![list("a", "Birthdays", false, true)];
        assert!(choose_destination(&lists, None, None).is_none());
        assert!(choose_destination(&[], Some("a"), Some("x")).is_none());
    }

    #[test]
    fn mirror_task_carries_tag_and_completion() {
        let mut r = Reminder::create(NewReminder::new("Buy milk").notes("2 litres")).unwrap();
        r.is_completed = true;

        let task = MirrorTask::from(&r);
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.notes, format!("[uuid:{}]\n2 litres", r.id));
        assert!(task.completed);
        assert!(task.due.is_none());
    }
}
