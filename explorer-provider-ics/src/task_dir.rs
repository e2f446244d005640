//! Directory layout for VTODO task lists.
//!
//! ```text
//! <ics_dir>/
//!   inbox/
//!     <task id>.ics
//!   shared/
//!     .readonly
//!     <task id>.ics
//! ```
//!
//! Each subdirectory is a list and each file holds one task. A task's id is
//! its file stem, which is also the VTODO UID.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use explorer_core::ics::{ParsedTodo, generate_todo, parse_todo};
use explorer_core::mirror::{FoundTask, MirrorTask, TaskList};
use explorer_core::reminder::{correlation_tag, parse_tagged_notes};
use thiserror::Error;

use crate::remote_config::{FALLBACK_LIST, IcsRemoteConfig};

const READONLY_MARKER: &str = ".readonly";

/// Reported to explorer as a `not_found` response rather than an error.
#[derive(Debug, Error)]
#[error("Task not found: {0}")]
pub struct TaskNotFound(pub String);

pub struct TaskDir {
    root: PathBuf,
    default_list: Option<String>,
}

/// A task file located on disk.
pub struct TaskFile {
    pub list_id: String,
    pub path: PathBuf,
    pub todo: ParsedTodo,
}

impl TaskDir {
    pub fn new(config: &IcsRemoteConfig) -> Self {
        TaskDir {
            root: config.ics_dir.clone(),
            default_list: config.ics_default_list.clone(),
        }
    }

    /// Create the root, and a first list when there is none.
    pub fn ensure_layout(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Could not create {}", self.root.display()))?;

        if self.lists()?.is_empty() {
            let first = self.default_list.as_deref().unwrap_or(FALLBACK_LIST);
            let dir = self.list_dir(first)?;
            fs::create_dir_all(&dir)
                .with_context(|| format!("Could not create {}", dir.display()))?;
        }

        Ok(())
    }

    pub fn lists(&self) -> Result<Vec<TaskList>> {
        let mut lists = Vec::new();

        for dir in self.list_dirs()? {
            let Some(id) = file_name(&dir) else {
                continue;
            };
            lists.push(TaskList {
                title: id.clone(),
                writable: is_writable(&dir),
                is_default: self.default_list.as_deref() == Some(id.as_str()),
                id,
            });
        }

        lists.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(lists)
    }

    /// Write a new task into `list_id`, returning its id.
    pub fn create(&self, list_id: &str, task: &MirrorTask) -> Result<String> {
        let dir = self.list_dir(list_id)?;
        if !dir.is_dir() {
            bail!("Task list '{list_id}' does not exist");
        }
        if !is_writable(&dir) {
            bail!("Task list '{list_id}' is read-only");
        }

        let task_id = uuid::Uuid::new_v4().to_string();
        write_todo(&dir.join(format!("{task_id}.ics")), &task_id, task)?;
        Ok(task_id)
    }

    /// Find a task by id across all lists.
    pub fn locate(&self, task_id: &str) -> Result<TaskFile> {
        if !is_safe_name(task_id) {
            return Err(TaskNotFound(task_id.to_string()).into());
        }

        for dir in self.list_dirs()? {
            let path = dir.join(format!("{task_id}.ics"));
            if !path.is_file() {
                continue;
            }
            let todo = read_todo(&path)?;
            return Ok(TaskFile {
                list_id: file_name(&dir).unwrap_or_default(),
                path,
                todo,
            });
        }

        Err(TaskNotFound(task_id.to_string()).into())
    }

    /// The task whose notes carry `tag`, if any.
    pub fn find_by_tag(&self, tag: &str) -> Result<Option<FoundTask>> {
        for dir in self.list_dirs()? {
            for path in ics_files(&dir)? {
                // Unreadable files can't be the one we're after.
                let Ok(todo) = read_todo(&path) else {
                    continue;
                };
                let (id, _) = parse_tagged_notes(&todo.task.notes);
                if id.is_some_and(|id| correlation_tag(&id) == tag) {
                    return Ok(file_stem(&path).zip(file_name(&dir)).map(
                        |(task_id, list_id)| FoundTask { task_id, list_id },
                    ));
                }
            }
        }
        Ok(None)
    }

    fn list_dir(&self, list_id: &str) -> Result<PathBuf> {
        if !is_safe_name(list_id) {
            bail!("Invalid task list id '{list_id}'");
        }
        Ok(self.root.join(list_id))
    }

    fn list_dirs(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("Could not read {}", self.root.display()))?;

        Ok(entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir() && file_name(p).is_some_and(|n| is_safe_name(&n)))
            .collect())
    }
}

impl TaskFile {
    pub fn task_id(&self) -> &str {
        &self.todo.uid
    }

    /// Replace the task's contents, alarm included.
    pub fn rewrite(&self, task: &MirrorTask) -> Result<()> {
        let dir = self.path.parent().unwrap_or(Path::new("."));
        if !is_writable(dir) {
            bail!("Task list '{}' is read-only", self.list_id);
        }
        write_todo(&self.path, self.task_id(), task)
    }

    pub fn remove(&self) -> Result<()> {
        let dir = self.path.parent().unwrap_or(Path::new("."));
        if !is_writable(dir) {
            bail!("Task list '{}' is read-only", self.list_id);
        }
        fs::remove_file(&self.path)
            .with_context(|| format!("Could not delete {}", self.path.display()))
    }
}

fn read_todo(path: &Path) -> Result<ParsedTodo> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))?;
    parse_todo(&content).with_context(|| format!("{} holds no VTODO", path.display()))
}

fn write_todo(path: &Path, uid: &str, task: &MirrorTask) -> Result<()> {
    let content = generate_todo(uid, task, Utc::now());

    let tmp = path.with_extension("ics.tmp");
    fs::write(&tmp, content).with_context(|| format!("Could not write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("Could not write {}", path.display()))?;
    Ok(())
}

fn ics_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Could not read {}", dir.display()))?;

    Ok(entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "ics"))
        .collect())
}

fn is_writable(dir: &Path) -> bool {
    !dir.join(READONLY_MARKER).exists()
}

fn is_safe_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('.') && !name.contains(['/', '\\'])
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().map(|n| n.to_string_lossy().into_owned())
}
