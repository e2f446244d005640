//! One-shot reminder notifications.
//!
//! Each reminder has at most one pending notification, keyed by the
//! reminder id. Delivery is someone else's job (see `explorer-notify`);
//! this module only keeps the schedule.

mod queue;

pub use queue::NotificationQueue;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ExplorerResult;
use crate::reminder::Reminder;

pub const DEFAULT_NOTIFICATION_TITLE: &str = "Reminder";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// The reminder id
    pub id: String,
    pub title: String,
    pub body: String,
    pub fire_at: DateTime<Utc>,
}

impl Notification {
    /// Notification for a reminder, or `None` when it has no due date.
    pub fn for_reminder(reminder: &Reminder, title: &str) -> Option<Self> {
        Some(Notification {
            id: reminder.id.clone(),
            title: title.to_string(),
            body: reminder.title.clone(),
            fire_at: reminder.due_date?,
        })
    }
}

#[async_trait]
pub trait NotificationScheduler: Send + Sync {
    /// Schedule a one-shot notification, replacing any pending one with the same id.
    async fn schedule(&self, notification: Notification) -> ExplorerResult<()>;

    /// Drop the pending notification with this id, if any.
    async fn cancel(&self, id: &str) -> ExplorerResult<()>;
}
