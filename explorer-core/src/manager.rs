//! The reminder lifecycle.
//!
//! `ReminderManager` is the only entry point that mutates reminders. Every
//! operation writes the local record first, then fans out to the task-list
//! mirror and the notification schedule. Those two are best effort: their
//! failures come back as [`SyncIssue`]s (or are logged, for notifications)
//! and never undo the local write.
//!
//! Operations on one reminder id are serialized, so an update can no longer
//! race a delete into touching a task that was just removed.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{ExplorerError, ExplorerResult};
use crate::locks::IdLocks;
use crate::mirror::{MirrorError, MirrorTask, NoMirror, TaskMirror, choose_destination};
use crate::notify::{DEFAULT_NOTIFICATION_TITLE, Notification, NotificationQueue, NotificationScheduler};
use crate::reminder::{NewReminder, Reminder, ReminderChanges, Section, by_due_date};
use crate::store::{LocalStore, ReminderStore};
use crate::sync::{PendingOp, PendingSync, ReconcileReport, SyncIssue, Synced};

#[derive(Debug, Clone)]
pub struct ManagerOptions {
    /// Mirror list that new tasks should go to, when writable
    pub destination_list: Option<String>,
    pub notification_title: String,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        ManagerOptions {
            destination_list: None,
            notification_title: DEFAULT_NOTIFICATION_TITLE.to_string(),
        }
    }
}

pub struct ReminderManager {
    store: Arc<dyn ReminderStore>,
    mirror: Arc<dyn TaskMirror>,
    notifier: Arc<dyn NotificationScheduler>,
    pending: PendingSync,
    options: ManagerOptions,
    locks: IdLocks,
}

impl ReminderManager {
    pub fn new(
        store: Arc<dyn ReminderStore>,
        mirror: Arc<dyn TaskMirror>,
        notifier: Arc<dyn NotificationScheduler>,
        pending: PendingSync,
        options: ManagerOptions,
    ) -> Self {
        ReminderManager {
            store,
            mirror,
            notifier,
            pending,
            options,
            locks: IdLocks::new(),
        }
    }

    /// Wire up the file-backed store, queue and configured mirror.
    pub fn from_config(config: &Config) -> ExplorerResult<Self> {
        let store = LocalStore::open(config.reminders_path())?;

        let mirror: Arc<dyn TaskMirror> = match &config.mirror {
            Some(mirror) => Arc::new(mirror.remote.clone()),
            None => Arc::new(NoMirror),
        };
        let destination_list = config.mirror.as_ref().and_then(|m| m.list.clone());

        Ok(Self::new(
            Arc::new(store),
            mirror,
            Arc::new(NotificationQueue::new(config.notifications_path())),
            PendingSync::new(config.pending_sync_path()),
            ManagerOptions {
                destination_list,
                notification_title: config.notification_title.clone(),
            },
        ))
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn get(&self, id: &str) -> ExplorerResult<Option<Reminder>> {
        self.store.get(id)
    }

    /// Look a reminder up by id or unique id prefix.
    pub fn find(&self, id_or_prefix: &str) -> ExplorerResult<Reminder> {
        if let Some(reminder) = self.store.get(id_or_prefix)? {
            return Ok(reminder);
        }

        let mut matches: Vec<Reminder> = self
            .store
            .all()?
            .into_iter()
            .filter(|r| !id_or_prefix.is_empty() && r.id.starts_with(id_or_prefix))
            .collect();

        match matches.len() {
            0 => Err(ExplorerError::NotFound(id_or_prefix.to_string())),
            1 => Ok(matches.remove(0)),
            n => Err(ExplorerError::Validation(format!(
                "'{id_or_prefix}' matches {n} reminders; use a longer id"
            ))),
        }
    }

    /// All reminders by ascending due date, undated ones last.
    pub fn list(&self) -> ExplorerResult<Vec<Reminder>> {
        let mut reminders = self.store.all()?;
        reminders.sort_by(by_due_date);
        Ok(reminders)
    }

    /// Reminders grouped into agenda sections, empty sections left out.
    pub fn agenda<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
    ) -> ExplorerResult<Vec<(Section, Vec<Reminder>)>> {
        let reminders = self.list()?;

        Ok(Section::ALL
            .iter()
            .map(|section| {
                let members: Vec<Reminder> = reminders
                    .iter()
                    .filter(|r| r.section(now) == *section)
                    .cloned()
                    .collect();
                (*section, members)
            })
            .filter(|(_, members)| !members.is_empty())
            .collect())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub async fn create(&self, new: NewReminder) -> ExplorerResult<Synced<Reminder>> {
        let mut reminder = Reminder::create(new)?;
        let _guard = self.locks.lock(&reminder.id).await;

        self.store.insert(&reminder)?;
        info!(reminder_id = %reminder.id, "reminder created");

        let issue = match self.ensure_access().await {
            Ok(()) => self.mirror_create(&mut reminder).await.err(),
            Err(issue) => Some(issue),
        };
        self.note_issue(&reminder.id, "create", issue.as_ref());

        if reminder.wants_notification(Utc::now()) {
            self.schedule_notification(&reminder).await;
        }

        Ok(Synced::new(reminder, issue))
    }

    pub async fn update(
        &self,
        id: &str,
        changes: ReminderChanges,
    ) -> ExplorerResult<Synced<Reminder>> {
        let _guard = self.locks.lock(id).await;
        let current = self.require(id)?;

        let mut reminder = changes.apply(&current)?;
        self.store.save(&reminder)?;
        info!(reminder_id = %reminder.id, "reminder updated");

        let issue = match reminder.external_event_id.clone() {
            Some(task_id) => self.mirror_update(&mut reminder, &task_id).await.err(),
            // Never mirrored (denied or failed before): try again now.
            None => match self.ensure_access().await {
                Ok(()) => self.mirror_create(&mut reminder).await.err(),
                Err(issue) => Some(issue),
            },
        };
        self.note_issue(&reminder.id, "update", issue.as_ref());

        self.sync_notification(&reminder).await;

        Ok(Synced::new(reminder, issue))
    }

    pub async fn delete(&self, id: &str) -> ExplorerResult<Synced<()>> {
        let _guard = self.locks.lock(id).await;
        let reminder = self.require(id)?;

        self.store.remove(id)?;
        info!(reminder_id = %id, "reminder deleted");

        if let Err(e) = self.notifier.cancel(id).await {
            warn!(reminder_id = %id, error = %e, "could not cancel notification");
        }

        let upsert = PendingOp::Upsert { id: id.to_string() };
        let task_id = match reminder.external_event_id.clone() {
            Some(task_id) => Ok(Some(task_id)),
            // A queued create may have reached the mirror without its link
            // being saved.
            None if self.is_queued(&upsert) => self
                .mirror
                .find_task_by_tag(&reminder.correlation_tag())
                .await
                .map(|found| found.map(|f| f.task_id))
                .map_err(SyncIssue::from),
            None => Ok(None),
        };

        let issue = match task_id {
            Ok(Some(task_id)) => self.mirror_delete(&task_id).await.err(),
            Ok(None) => None,
            Err(issue) => Some(issue),
        };
        if let Some(issue) = &issue {
            warn!(reminder_id = %id, %issue, "task list not updated on delete");
        }

        self.unqueue(&upsert);

        Ok(Synced::new((), issue))
    }

    pub async fn set_completion(
        &self,
        id: &str,
        completed: bool,
    ) -> ExplorerResult<Synced<Reminder>> {
        let _guard = self.locks.lock(id).await;
        let mut reminder = self.require(id)?;

        reminder.is_completed = completed;
        self.store.save(&reminder)?;
        info!(reminder_id = %id, completed, "reminder completion changed");

        let issue = match reminder.external_event_id.clone() {
            Some(task_id) => self.mirror_completion(&mut reminder, &task_id).await.err(),
            None => None,
        };
        self.note_issue(id, "completion", issue.as_ref());

        self.sync_notification(&reminder).await;

        Ok(Synced::new(reminder, issue))
    }

    /// Replay failed mirror writes, then mirror any reminder not yet linked.
    pub async fn reconcile(&self) -> ExplorerResult<ReconcileReport> {
        let mut report = ReconcileReport::default();
        let ops = self.pending.all()?;

        if let Err(issue) = self.ensure_access().await {
            report.failed = ops.into_iter().map(|op| (op, issue.clone())).collect();
            return Ok(report);
        }

        let mut handled = Vec::new();
        for op in ops {
            let result = match &op {
                PendingOp::Delete { task_id } => match self.mirror.delete_task(task_id).await {
                    Ok(()) | Err(MirrorError::NotFound(_)) => Ok(()),
                    Err(e) => Err(SyncIssue::from(e)),
                },
                PendingOp::Upsert { id } => {
                    handled.push(id.clone());
                    self.reconcile_one(id).await
                }
            };
            self.record_outcome(op, result, &mut report);
        }

        let unlinked: Vec<String> = self
            .store
            .all()?
            .into_iter()
            .filter(|r| r.external_event_id.is_none() && !handled.contains(&r.id))
            .map(|r| r.id)
            .collect();

        for id in unlinked {
            let result = self.reconcile_one(&id).await;
            self.record_outcome(PendingOp::Upsert { id }, result, &mut report);
        }

        info!(
            resolved = report.resolved,
            failed = report.failed.len(),
            "reconcile finished"
        );
        Ok(report)
    }

    // =========================================================================
    // Mirror helpers
    // =========================================================================

    async fn ensure_access(&self) -> Result<(), SyncIssue> {
        if self.mirror.request_access().await? {
            Ok(())
        } else {
            Err(SyncIssue::AccessDenied)
        }
    }

    /// Create the task and persist the link on the local record.
    async fn mirror_create(&self, reminder: &mut Reminder) -> Result<(), SyncIssue> {
        let lists = self.mirror.lists().await?;
        let destination = choose_destination(
            &lists,
            self.options.destination_list.as_deref(),
            reminder.list.as_deref(),
        )
        .ok_or(SyncIssue::NoWritableList)?;

        let task_id = self
            .mirror
            .create_task(&destination.id, &MirrorTask::from(&*reminder))
            .await?;

        self.link(reminder, Some(task_id), Some(destination.id.clone()))
    }

    /// A task already gone counts as deleted; other failures are queued.
    async fn mirror_delete(&self, task_id: &str) -> Result<(), SyncIssue> {
        match self.mirror.delete_task(task_id).await {
            Ok(()) => Ok(()),
            Err(MirrorError::NotFound(task_id)) => Err(SyncIssue::NotFound(task_id)),
            Err(e) => {
                self.queue(PendingOp::Delete {
                    task_id: task_id.to_string(),
                });
                Err(e.into())
            }
        }
    }

    async fn mirror_update(&self, reminder: &mut Reminder, task_id: &str) -> Result<(), SyncIssue> {
        match self
            .mirror
            .update_task(task_id, &MirrorTask::from(&*reminder))
            .await
        {
            Ok(()) => Ok(()),
            Err(MirrorError::NotFound(_)) => self.unlink_missing(reminder, task_id),
            Err(e) => Err(e.into()),
        }
    }

    async fn mirror_completion(
        &self,
        reminder: &mut Reminder,
        task_id: &str,
    ) -> Result<(), SyncIssue> {
        self.ensure_access().await?;
        match self
            .mirror
            .set_completion(task_id, reminder.is_completed)
            .await
        {
            Ok(()) => Ok(()),
            Err(MirrorError::NotFound(_)) => self.unlink_missing(reminder, task_id),
            Err(e) => Err(e.into()),
        }
    }

    /// The linked task is gone from the mirror; forget the stale link.
    fn unlink_missing(&self, reminder: &mut Reminder, task_id: &str) -> Result<(), SyncIssue> {
        self.link(reminder, None, None)?;
        Err(SyncIssue::NotFound(task_id.to_string()))
    }

    fn link(
        &self,
        reminder: &mut Reminder,
        task_id: Option<String>,
        list_id: Option<String>,
    ) -> Result<(), SyncIssue> {
        reminder.external_event_id = task_id;
        reminder.external_list_id = list_id;
        self.store
            .save(reminder)
            .map_err(|e| SyncIssue::Local(e.to_string()))
    }

    /// Bring one reminder's task in line with its local record.
    async fn reconcile_one(&self, id: &str) -> Result<(), SyncIssue> {
        let _guard = self.locks.lock(id).await;

        let Some(mut reminder) = self
            .store
            .get(id)
            .map_err(|e| SyncIssue::Local(e.to_string()))?
        else {
            // Deleted locally since it was queued.
            return Ok(());
        };

        if reminder.external_event_id.is_none()
            && let Some(found) = self
                .mirror
                .find_task_by_tag(&reminder.correlation_tag())
                .await?
        {
            info!(reminder_id = %id, task_id = %found.task_id, "relinked task by correlation tag");
            self.link(&mut reminder, Some(found.task_id), Some(found.list_id))?;
        }

        if let Some(task_id) = reminder.external_event_id.clone() {
            match self.mirror_update(&mut reminder, &task_id).await {
                Ok(()) => {
                    self.mirror
                        .set_completion(&task_id, reminder.is_completed)
                        .await?;
                    return Ok(());
                }
                // Link already cleared; recreate below.
                Err(SyncIssue::NotFound(_)) => {}
                Err(issue) => return Err(issue),
            }
        }

        self.mirror_create(&mut reminder).await
    }

    fn record_outcome(
        &self,
        op: PendingOp,
        result: Result<(), SyncIssue>,
        report: &mut ReconcileReport,
    ) {
        match result {
            Ok(()) => {
                self.unqueue(&op);
                report.resolved += 1;
            }
            Err(issue) => {
                warn!(?op, %issue, "pending sync still failing");
                report.failed.push((op, issue));
            }
        }
    }

    fn note_issue(&self, id: &str, operation: &str, issue: Option<&SyncIssue>) {
        let Some(issue) = issue else {
            return;
        };

        warn!(reminder_id = %id, operation, %issue, "task list out of sync");
        if issue.is_retryable() {
            self.queue(PendingOp::Upsert { id: id.to_string() });
        }
    }

    fn queue(&self, op: PendingOp) {
        if let Err(e) = self.pending.push(op) {
            warn!(error = %e, "could not queue pending sync");
        }
    }

    fn is_queued(&self, op: &PendingOp) -> bool {
        match self.pending.all() {
            Ok(ops) => ops.contains(op),
            Err(e) => {
                warn!(error = %e, "could not read pending sync queue");
                false
            }
        }
    }

    fn unqueue(&self, op: &PendingOp) {
        if let Err(e) = self.pending.remove(op) {
            warn!(error = %e, "could not update pending sync queue");
        }
    }

    // =========================================================================
    // Notification helpers
    // =========================================================================

    async fn schedule_notification(&self, reminder: &Reminder) {
        let Some(notification) =
            Notification::for_reminder(reminder, &self.options.notification_title)
        else {
            return;
        };

        if let Err(e) = self.notifier.schedule(notification).await {
            warn!(reminder_id = %reminder.id, error = %e, "could not schedule notification");
        }
    }

    /// Schedule when the reminder still wants one, cancel otherwise.
    async fn sync_notification(&self, reminder: &Reminder) {
        if reminder.wants_notification(Utc::now()) {
            self.schedule_notification(reminder).await;
        } else if let Err(e) = self.notifier.cancel(&reminder.id).await {
            warn!(reminder_id = %reminder.id, error = %e, "could not cancel notification");
        }
    }

    fn require(&self, id: &str) -> ExplorerResult<Reminder> {
        self.store
            .get(id)?
            .ok_or_else(|| ExplorerError::NotFound(id.to_string()))
    }
}
