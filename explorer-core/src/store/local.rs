//! Reminder records stored as one TOML file per reminder.

use std::path::{Path, PathBuf};

use super::ReminderStore;
use crate::error::{ExplorerError, ExplorerResult};
use crate::reminder::Reminder;

const EXTENSION: &str = "toml";

/// A directory of `<id>.toml` reminder files.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// Open the store, creating its directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> ExplorerResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            ExplorerError::Store(format!("Could not create {}: {e}", dir.display()))
        })?;
        Ok(LocalStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> Option<PathBuf> {
        // Ids become filenames; refuse anything that could escape the directory.
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return None;
        }
        Some(self.dir.join(format!("{id}.{EXTENSION}")))
    }

    fn write(&self, reminder: &Reminder) -> ExplorerResult<()> {
        let path = self
            .path_for(&reminder.id)
            .ok_or_else(|| ExplorerError::Validation(format!("invalid id '{}'", reminder.id)))?;

        let content = toml::to_string_pretty(reminder)
            .map_err(|e| ExplorerError::Serialization(e.to_string()))?;

        // Write next to the target and rename so a crash never leaves half a record.
        let tmp = self.dir.join(format!(".{}.tmp", reminder.id));
        std::fs::write(&tmp, content)
            .and_then(|()| std::fs::rename(&tmp, &path))
            .map_err(|e| ExplorerError::Store(format!("Could not write {}: {e}", path.display())))
    }
}

fn read_record(path: &Path) -> ExplorerResult<Reminder> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ExplorerError::Store(format!("Could not read {}: {e}", path.display())))?;

    toml::from_str(&content)
        .map_err(|e| ExplorerError::Store(format!("Could not parse {}: {e}", path.display())))
}

impl ReminderStore for LocalStore {
    fn insert(&self, reminder: &Reminder) -> ExplorerResult<()> {
        if let Some(path) = self.path_for(&reminder.id)
            && path.exists()
        {
            return Err(ExplorerError::AlreadyExists(reminder.id.clone()));
        }
        self.write(reminder)
    }

    fn save(&self, reminder: &Reminder) -> ExplorerResult<()> {
        self.write(reminder)
    }

    fn get(&self, id: &str) -> ExplorerResult<Option<Reminder>> {
        let Some(path) = self.path_for(id) else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        read_record(&path).map(Some)
    }

    fn remove(&self, id: &str) -> ExplorerResult<bool> {
        let Some(path) = self.path_for(id) else {
            return Ok(false);
        };
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ExplorerError::Store(format!(
                "Could not delete {}: {e}",
                path.display()
            ))),
        }
    }

    fn all(&self) -> ExplorerResult<Vec<Reminder>> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| {
            ExplorerError::Store(format!("Could not read {}: {e}", self.dir.display()))
        })?;

        let reminders = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|e| e == EXTENSION))
            .filter_map(|path| match read_record(&path) {
                Ok(reminder) => Some(reminder),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable reminder");
                    None
                }
            })
            .collect();

        Ok(reminders)
    }
}
