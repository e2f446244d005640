//! In-memory collaborators with failure switches, for manager tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{ExplorerError, ExplorerResult};
use crate::mirror::{FoundTask, MirrorError, MirrorResult, MirrorTask, TaskList, TaskMirror};
use crate::notify::{Notification, NotificationScheduler};
use crate::reminder::parse_tagged_notes;

#[derive(Debug, Clone)]
pub struct FakeTask {
    pub list_id: String,
    pub task: MirrorTask,
    pub alarms: Vec<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct MirrorState {
    pub access: bool,
    pub lists: Vec<TaskList>,
    pub tasks: HashMap<String, FakeTask>,
    pub fail_writes: bool,
    pub calls: Vec<&'static str>,
    next_id: usize,
}

#[derive(Debug)]
pub struct FakeMirror {
    pub state: Mutex<MirrorState>,
    delay: Option<Duration>,
}

impl FakeMirror {
    pub fn new() -> Self {
        FakeMirror {
            state: Mutex::new(MirrorState {
                access: true,
                lists: vec![TaskList {
                    id: "inbox".into(),
                    title: "Reminders".into(),
                    writable: true,
                    is_default: true,
                }],
                tasks: HashMap::new(),
                fail_writes: false,
                calls: Vec::new(),
                next_id: 0,
            }),
            delay: None,
        }
    }

    pub fn denied() -> Self {
        let mirror = Self::new();
        mirror.state().access = false;
        mirror
    }

    /// Every call sleeps first, so overlapping operations interleave.
    pub fn slow(delay: Duration) -> Self {
        FakeMirror {
            delay: Some(delay),
            ..Self::new()
        }
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, MirrorState> {
        self.state.lock().unwrap()
    }

    pub fn task(&self, id: &str) -> Option<FakeTask> {
        self.state().tasks.get(id).cloned()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state().calls.clone()
    }

    async fn enter(&self, call: &'static str) -> MirrorResult<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state();
        state.calls.push(call);
        if state.fail_writes && call != "request_access" && call != "lists" {
            return Err(MirrorError::Failed(format!("{call} failed")));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskMirror for FakeMirror {
    async fn request_access(&self) -> MirrorResult<bool> {
        self.enter("request_access").await?;
        Ok(self.state().access)
    }

    async fn lists(&self) -> MirrorResult<Vec<TaskList>> {
        self.enter("lists").await?;
        Ok(self.state().lists.clone())
    }

    async fn create_task(&self, list_id: &str, task: &MirrorTask) -> MirrorResult<String> {
        self.enter("create_task").await?;
        let mut state = self.state();
        state.next_id += 1;
        let id = format!("task-{}", state.next_id);
        state.tasks.insert(
            id.clone(),
            FakeTask {
                list_id: list_id.to_string(),
                task: task.clone(),
                alarms: task.due.into_iter().collect(),
            },
        );
        Ok(id)
    }

    async fn update_task(&self, task_id: &str, task: &MirrorTask) -> MirrorResult<()> {
        self.enter("update_task").await?;
        let mut state = self.state();
        let existing = state
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| MirrorError::NotFound(task_id.to_string()))?;
        existing.task = task.clone();
        existing.alarms = task.due.into_iter().collect();
        Ok(())
    }

    async fn delete_task(&self, task_id: &str) -> MirrorResult<()> {
        self.enter("delete_task").await?;
        self.state()
            .tasks
            .remove(task_id)
            .map(|_| ())
            .ok_or_else(|| MirrorError::NotFound(task_id.to_string()))
    }

    async fn find_task_by_tag(&self, tag: &str) -> MirrorResult<Option<FoundTask>> {
        self.enter("find_task_by_tag").await?;
        let state = self.state();
        Ok(state
            .tasks
            .iter()
            .find(|(_, t)| {
                let (id, _) = parse_tagged_notes(&t.task.notes);
                id.is_some_and(|id| crate::reminder::correlation_tag(&id) == tag)
            })
            .map(|(id, t)| FoundTask {
                task_id: id.clone(),
                list_id: t.list_id.clone(),
            }))
    }

    async fn set_completion(&self, task_id: &str, completed: bool) -> MirrorResult<()> {
        self.enter("set_completion").await?;
        let mut state = self.state();
        let existing = state
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| MirrorError::NotFound(task_id.to_string()))?;
        existing.task.completed = completed;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeScheduler {
    pub pending: Mutex<HashMap<String, Notification>>,
    pub fail: Mutex<bool>,
    pub schedule_calls: Mutex<usize>,
}

impl FakeScheduler {
    pub fn failing() -> Self {
        let scheduler = Self::default();
        *scheduler.fail.lock().unwrap() = true;
        scheduler
    }

    pub fn get(&self, id: &str) -> Option<Notification> {
        self.pending.lock().unwrap().get(id).cloned()
    }

    pub fn count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    pub fn schedule_calls(&self) -> usize {
        *self.schedule_calls.lock().unwrap()
    }

    fn check(&self) -> ExplorerResult<()> {
        if *self.fail.lock().unwrap() {
            return Err(ExplorerError::Io(std::io::Error::other("notification center down")));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationScheduler for FakeScheduler {
    async fn schedule(&self, notification: Notification) -> ExplorerResult<()> {
        *self.schedule_calls.lock().unwrap() += 1;
        self.check()?;
        self.pending
            .lock()
            .unwrap()
            .insert(notification.id.clone(), notification);
        Ok(())
    }

    async fn cancel(&self, id: &str) -> ExplorerResult<()> {
        self.check()?;
        self.pending.lock().unwrap().remove(id);
        Ok(())
    }
}
