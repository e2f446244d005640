//! Pending notifications persisted as a TOML file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{Notification, NotificationScheduler};
use crate::error::{ExplorerError, ExplorerResult};
use crate::lockfile::FileLock;

#[derive(Debug, Default, Serialize, Deserialize)]
struct QueueFile {
    #[serde(default, rename = "notification")]
    notifications: Vec<Notification>,
}

/// File-backed notification schedule shared by the CLI and `explorer-notify`.
///
/// The in-process mutex keeps tasks of one process off each other; the
/// file lock does the same across processes.
#[derive(Debug)]
pub struct NotificationQueue {
    path: PathBuf,
    lock: Mutex<()>,
}

impl NotificationQueue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        NotificationQueue {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All pending notifications, soonest first.
    pub async fn pending(&self) -> ExplorerResult<Vec<Notification>> {
        let _guard = self.lock.lock().await;
        let _file_lock = FileLock::acquire(&self.path)?;
        let mut pending = self.load()?.notifications;
        pending.sort_by(|a, b| a.fire_at.cmp(&b.fire_at).then_with(|| a.id.cmp(&b.id)));
        Ok(pending)
    }

    /// Remove and return every notification due at or before `now`.
    pub async fn take_due(&self, now: DateTime<Utc>) -> ExplorerResult<Vec<Notification>> {
        let _guard = self.lock.lock().await;
        let _file_lock = FileLock::acquire(&self.path)?;
        let file = self.load()?;

        let (mut due, pending): (Vec<_>, Vec<_>) = file
            .notifications
            .into_iter()
            .partition(|n| n.fire_at <= now);

        if !due.is_empty() {
            self.save(&QueueFile {
                notifications: pending,
            })?;
        }

        due.sort_by(|a, b| a.fire_at.cmp(&b.fire_at));
        Ok(due)
    }

    fn load(&self) -> ExplorerResult<QueueFile> {
        if !self.path.exists() {
            return Ok(QueueFile::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        toml::from_str(&content).map_err(|e| {
            ExplorerError::Serialization(format!("Could not parse {}: {e}", self.path.display()))
        })
    }

    /// Callers hold the file lock, so the temp name is never shared.
    fn save(&self, file: &QueueFile) -> ExplorerResult<()> {
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

#[async_trait]
impl NotificationScheduler for NotificationQueue {
    async fn schedule(&self, notification: Notification) -> ExplorerResult<()> {
        let _guard = self.lock.lock().await;
        let _file_lock = FileLock::acquire(&self.path)?;
        let mut file = self.load()?;

        file.notifications.retain(|n| n.id != notification.id);
        file.notifications.push(notification);

        self.save(&file)
    }

    async fn cancel(&self, id: &str) -> ExplorerResult<()> {
        let _guard = self.lock.lock().await;
        let _file_lock = FileLock::acquire(&self.path)?;
        let mut file = self.load()?;

        let before = file.notifications.len();
        file.notifications.retain(|n| n.id != id);

        if file.notifications.len() != before {
            self.save(&file)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn make_notification(id: &str, fire_at: DateTime<Utc>) -> Notification {
        Notification {
            id: id.into(),
            title: "Reminder".into(),
            body: format!("body of {id}"),
            fire_at,
        }
    }

    fn make_queue() -> (tempfile::TempDir, NotificationQueue) {
        let tmp = tempfile::tempdir().unwrap();
        let queue = NotificationQueue::new(tmp.path().join("notifications.toml"));
        (tmp, queue)
    }

    #[tokio::test]
    async fn schedule_is_idempotent_on_id() {
        let (_tmp, queue) = make_queue();
        let t = Utc.with_ymd_and_hms(2025, 3, 20, 15, 0, 0).unwrap();

        queue.schedule(make_notification("a", t)).await.unwrap();
        queue
            .schedule(make_notification("a", t + Duration::hours(1)))
            .await
            .unwrap();

        let pending = queue.pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].fire_at, t + Duration::hours(1));
    }

    #[tokio::test]
    async fn cancel_removes_only_that_id() {
        let (_tmp, queue) = make_queue();
        let t = Utc.with_ymd_and_hms(2025, 3, 20, 15, 0, 0).unwrap();
        queue.schedule(make_notification("a", t)).await.unwrap();
        queue.schedule(make_notification("b", t)).await.unwrap();

        queue.cancel("a").await.unwrap();
        queue.cancel("missing").await.unwrap();

        let ids: Vec<_> = queue
            .pending()
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[tokio::test]
    async fn take_due_removes_fired_notifications() {
        let (_tmp, queue) = make_queue();
        let now = Utc.with_ymd_and_hms(2025, 3, 20, 15, 0, 0).unwrap();
        queue
            .schedule(make_notification("past", now - Duration::minutes(1)))
            .await
            .unwrap();
        queue.schedule(make_notification("now", now)).await.unwrap();
        queue
            .schedule(make_notification("future", now + Duration::minutes(1)))
            .await
            .unwrap();

        let due: Vec<_> = queue
            .take_due(now)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(due, vec!["past", "now"]);

        let left = queue.pending().await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, "future");
        assert!(queue.take_due(now).await.unwrap().is_empty());
    }

    #[test]
    fn queues_in_separate_threads_keep_every_schedule() {
        let (_tmp, queue) = make_queue();
        let t = Utc.with_ymd_and_hms(2025, 3, 20, 15, 0, 0).unwrap();

        let writers: Vec<_> = ["cli", "daemon"]
            .into_iter()
            .map(|who| {
                let path = queue.path().to_path_buf();
                std::thread::spawn(move || {
                    let runtime = tokio::runtime::Builder::new_current_thread()
                        .build()
                        .unwrap();
                    let own = NotificationQueue::new(path);
                    runtime.block_on(async {
                        for i in 0..50 {
                            own.schedule(make_notification(&format!("{who}-{i}"), t))
                                .await
                                .unwrap();
                        }
                    });
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let pending = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(queue.pending())
            .unwrap();
        assert_eq!(pending.len(), 100);
    }

    #[tokio::test]
    async fn missing_file_is_an_empty_queue() {
        let (_tmp, queue) = make_queue();
        assert!(queue.pending().await.unwrap().is_empty());
        queue.cancel("a").await.unwrap();
        assert!(!queue.path().exists());
    }
}
