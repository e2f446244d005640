//! Outcome reporting and retry bookkeeping for mirror writes.

mod pending;

pub use pending::{PendingOp, PendingSync};

use std::fmt;

use crate::mirror::MirrorError;

/// Why the external mirror did not end up matching the local record.
///
/// Issues never undo a local write; the local record stays valid in a
/// degraded, local-only state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncIssue {
    AccessDenied,
    NoWritableList,
    /// The linked task no longer exists in the mirror
    NotFound(String),
    Mirror(String),
    /// The mirror write went through but linking it locally failed
    Local(String),
}

impl SyncIssue {
    /// Whether replaying the operation later could succeed without user action.
    ///
    /// A vanished task is retryable: the stale link is cleared first, so the
    /// replay creates a fresh task.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncIssue::NotFound(_) | SyncIssue::Mirror(_) | SyncIssue::Local(_)
        )
    }
}

impl From<MirrorError> for SyncIssue {
    fn from(error: MirrorError) -> Self {
        match error {
            MirrorError::AccessDenied => SyncIssue::AccessDenied,
            MirrorError::NotFound(id) => SyncIssue::NotFound(id),
            MirrorError::Failed(msg) => SyncIssue::Mirror(msg),
        }
    }
}

impl fmt::Display for SyncIssue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SyncIssue::AccessDenied => write!(f, "access to the task list was denied"),
            SyncIssue::NoWritableList => write!(f, "no writable task list available"),
            SyncIssue::NotFound(id) => write!(f, "task {id} no longer exists in the task list"),
            SyncIssue::Mirror(msg) => write!(f, "task list error: {msg}"),
            SyncIssue::Local(msg) => write!(f, "could not record task link: {msg}"),
        }
    }
}

/// Result of a reminder operation: the committed local value plus any
/// mirror problems met along the way.
#[derive(Debug, Clone)]
pub struct Synced<T> {
    pub value: T,
    pub issues: Vec<SyncIssue>,
}

impl<T> Synced<T> {
    pub fn new(value: T, issue: Option<SyncIssue>) -> Self {
        Synced {
            value,
            issues: issue.into_iter().collect(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Outcome of replaying the pending-sync queue.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub resolved: usize,
    pub failed: Vec<(PendingOp, SyncIssue)>,
}
