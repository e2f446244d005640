//! Error types for the Explorer reminders ecosystem.

use thiserror::Error;

/// Errors that can occur in reminder operations.
///
/// Only failures of the local record store (and bad input) abort an
/// operation. Mirror and notification failures are reported as
/// [`crate::sync::SyncIssue`]s instead.
#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid reminder: {0}")]
    Validation(String),

    #[error("Reminder not found: {0}")]
    NotFound(String),

    #[error("Reminder already exists: {0}")]
    AlreadyExists(String),

    #[error("Local store error: {0}")]
    Store(String),

    #[error("Task not found in task list: {0}")]
    RemoteNotFound(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("{0}")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for reminder operations.
pub type ExplorerResult<T> = Result<T, ExplorerError>;
