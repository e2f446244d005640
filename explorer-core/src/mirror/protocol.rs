//! Defines the JSON protocol used for communication between the Explorer
//! CLI and task-list provider binaries over stdin/stdout.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::mirror::{FoundTask, MirrorTask, TaskList};

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    RequestAccess,
    ListLists,
    CreateTask,
    UpdateTask,
    DeleteTask,
    FindTask,
    SetCompletion,
}

/// Request sent from CLI to provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from provider to CLI.
///
/// `NotFound` is kept apart from `Error` so a missing task can be told
/// from a failing provider.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    NotFound { error: String },
    Error { error: String },
}

impl<T: Serialize> Response<T> {
    pub fn success(data: T) -> String {
        serde_json::to_string(&Response::Success { data })
            .unwrap_or_else(|e| Response::<()>::error(&format!("Failed to encode response: {e}")))
    }
}

impl Response<()> {
    pub fn error(msg: &str) -> String {
        encode_failure(&Response::<()>::Error {
            error: msg.to_string(),
        })
    }

    pub fn not_found(task_id: &str) -> String {
        encode_failure(&Response::<()>::NotFound {
            error: task_id.to_string(),
        })
    }
}

fn encode_failure(response: &Response<()>) -> String {
    // Only strings inside; encoding cannot fail, but never panic in a provider.
    serde_json::to_string(response)
        .unwrap_or_else(|_| r#"{"status":"error","error":"unencodable error"}"#.to_string())
}

/// Ask the provider whether Explorer may write tasks.
#[derive(Debug, Serialize, Deserialize)]
pub struct RequestAccess {
    /// Provider-specific config (e.g., ics_dir)
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
}

impl ProviderCommand for RequestAccess {
    type Response = bool;
    fn command() -> Command {
        Command::RequestAccess
    }
}

/// List the task lists the provider exposes.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListLists {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
}

impl ProviderCommand for ListLists {
    type Response = Vec<TaskList>;
    fn command() -> Command {
        Command::ListLists
    }
}

/// Create a task; the provider answers with the new task's id.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTask {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub list_id: String,
    pub task: MirrorTask,
}

impl ProviderCommand for CreateTask {
    type Response = String;
    fn command() -> Command {
        Command::CreateTask
    }
}

/// Replace a task's title, notes, due date and alarm.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateTask {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub task_id: String,
    pub task: MirrorTask,
}

impl ProviderCommand for UpdateTask {
    type Response = ();
    fn command() -> Command {
        Command::UpdateTask
    }
}

/// Delete a task by ID.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteTask {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub task_id: String,
}

impl ProviderCommand for DeleteTask {
    type Response = ();
    fn command() -> Command {
        Command::DeleteTask
    }
}

/// Find a task whose notes carry a correlation tag.
#[derive(Debug, Serialize, Deserialize)]
pub struct FindTask {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub tag: String,
}

impl ProviderCommand for FindTask {
    type Response = Option<FoundTask>;
    fn command() -> Command {
        Command::FindTask
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetCompletion {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub task_id: String,
    pub completed: bool,
}

impl ProviderCommand for SetCompletion {
    type Response = ();
    fn command() -> Command {
        Command::SetCompletion
    }
}
