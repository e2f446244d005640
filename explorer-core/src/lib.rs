//! Core types for the Explorer reminders ecosystem.
//!
//! This crate is shared by the `explorer` CLI, the task-list providers and
//! the notification daemon:
//! - `reminder` holds the reminder record and its correlation tag
//! - `store` is the local record store (the source of truth)
//! - `mirror` talks to the user's external task list through a provider binary
//! - `notify` keeps the queue of one-shot reminder notifications
//! - `manager` fans every reminder mutation out to all three

pub mod config;
pub mod error;
pub mod ics;
mod lockfile;
pub mod locks;
pub mod manager;
pub mod mirror;
pub mod notify;
pub mod reminder;
pub mod store;
pub mod sync;

#[cfg(test)]
mod testing;

pub use error::{ExplorerError, ExplorerResult};
pub use manager::{ManagerOptions, ReminderManager};
pub use reminder::{NewReminder, Reminder, ReminderChanges};
