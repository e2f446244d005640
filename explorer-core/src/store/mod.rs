//! Local reminder storage.
//!
//! The local store is the single source of truth for reminders. Every
//! other copy (mirrored task, pending notification) is derived from it.

mod local;

pub use local::LocalStore;

use crate::error::ExplorerResult;
use crate::reminder::Reminder;

/// Durable storage for reminder records.
///
/// Failures here are fatal to the operation that triggered them and are
/// always returned to the caller.
pub trait ReminderStore: Send + Sync {
    /// Store a new record. Fails if a record with the same id exists.
    fn insert(&self, reminder: &Reminder) -> ExplorerResult<()>;

    /// Create or replace a record.
    fn save(&self, reminder: &Reminder) -> ExplorerResult<()>;

    fn get(&self, id: &str) -> ExplorerResult<Option<Reminder>>;

    /// Remove a record, returning whether it existed.
    fn remove(&self, id: &str) -> ExplorerResult<bool>;

    /// All records, in no particular order.
    fn all(&self) -> ExplorerResult<Vec<Reminder>>;
}
