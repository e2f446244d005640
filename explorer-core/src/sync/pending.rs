//! Queue of mirror writes that failed and should be replayed.

use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::{ExplorerError, ExplorerResult};
use crate::lockfile::FileLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PendingOp {
    /// Bring the mirrored task of this reminder in line with the local record
    Upsert { id: String },
    /// Delete a task whose reminder is already gone locally
    Delete { task_id: String },
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PendingFile {
    #[serde(default, rename = "pending")]
    ops: Vec<PendingOp>,
}

/// File-backed, deduplicated list of [`PendingOp`]s.
#[derive(Debug)]
pub struct PendingSync {
    path: PathBuf,
    lock: Mutex<()>,
}

impl PendingSync {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PendingSync {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn all(&self) -> ExplorerResult<Vec<PendingOp>> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        let _file_lock = FileLock::acquire(&self.path)?;
        Ok(self.load()?.ops)
    }

    pub fn push(&self, op: PendingOp) -> ExplorerResult<()> {
        self.modify(|ops| {
            if ops.contains(&op) {
                false
            } else {
                ops.push(op);
                true
            }
        })
    }

    pub fn remove(&self, op: &PendingOp) -> ExplorerResult<()> {
        self.modify(|ops| {
            let before = ops.len();
            ops.retain(|o| o != op);
            ops.len() != before
        })
    }

    /// Apply `change`; it returns whether anything changed and needs saving.
    fn modify(&self, change: impl FnOnce(&mut Vec<PendingOp>) -> bool) -> ExplorerResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        let _file_lock = FileLock::acquire(&self.path)?;
        let mut file = self.load()?;
        if change(&mut file.ops) {
            self.save(&file)?;
        }
        Ok(())
    }

    fn load(&self) -> ExplorerResult<PendingFile> {
        if !self.path.exists() {
            return Ok(PendingFile::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        toml::from_str(&content).map_err(|e| {
            ExplorerError::Serialization(format!("Could not parse {}: {e}", self.path.display()))
        })
    }

    fn save(&self, file: &PendingFile) -> ExplorerResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(file).map_err(|e| ExplorerError::Serialization(e.to_string()))?;
        let tmp = self.path.with_extension("toml.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_deduplicates_and_persists() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("pending-sync.toml");
        let pending = PendingSync::new(&path);

        pending.push(PendingOp::Upsert { id: "a".into() }).unwrap();
        pending.push(PendingOp::Upsert { id: "a".into() }).unwrap();
        pending
            .push(PendingOp::Delete {
                task_id: "t1".into(),
            })
            .unwrap();

        let reopened = PendingSync::new(&path);
        assert_eq!(
            reopened.all().unwrap(),
            vec![
                PendingOp::Upsert { id: "a".into() },
                PendingOp::Delete {
                    task_id: "t1".into()
                },
            ]
        );

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("op = \"upsert\""), "{content}");
    }

    #[test]
    fn queues_in_separate_threads_keep_every_op() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("pending-sync.toml");

        let writers: Vec<_> = ["a", "b"]
            .into_iter()
            .map(|run| {
                let own = PendingSync::new(&path);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        own.push(PendingOp::Upsert {
                            id: format!("{run}-{i}"),
                        })
                        .unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        assert_eq!(PendingSync::new(&path).all().unwrap().len(), 100);
    }

    #[test]
    fn remove_drops_only_matching_op() {
        let tmp = tempfile::tempdir().unwrap();
        let pending = PendingSync::new(tmp.path().join("pending-sync.toml"));
        pending.push(PendingOp::Upsert { id: "a".into() }).unwrap();
        pending.push(PendingOp::Upsert { id: "b".into() }).unwrap();

        pending.remove(&PendingOp::Upsert { id: "a".into() }).unwrap();
        assert_eq!(pending.all().unwrap(), vec![PendingOp::Upsert { id: "b".into() }]);
    }
}
