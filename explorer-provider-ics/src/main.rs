//! explorer-provider-ics - local VTODO task lists for explorer
//!
//! This binary implements the explorer provider protocol, communicating
//! with explorer via JSON over stdin/stdout. Tasks are plain .ics files:
//!   <ics_dir>/<list>/<task id>.ics

mod commands;
mod remote_config;
mod task_dir;

use anyhow::Result;
use explorer_core::mirror::protocol::{Command, ProviderCommand, Request, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::task_dir::TaskNotFound;

#[tokio::main]
async fn main() -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => handle_request(request).await,
            Err(e) => Response::error(&format!("Failed to parse request: {e}")),
        };

        stdout.write_all(format!("{response}\n").as_bytes()).await?;
        stdout.flush().await?;
    }

    Ok(())
}

async fn handle_request(request: Request) -> String {
    let params = request.params;
    match request.command {
        Command::RequestAccess => dispatch(params, commands::request_access::handle).await,
        Command::ListLists => dispatch(params, commands::list_lists::handle).await,
        Command::CreateTask => dispatch(params, commands::create_task::handle).await,
        Command::UpdateTask => dispatch(params, commands::update_task::handle).await,
        Command::DeleteTask => dispatch(params, commands::delete_task::handle).await,
        Command::FindTask => dispatch(params, commands::find_task::handle).await,
        Command::SetCompletion => dispatch(params, commands::set_completion::handle).await,
    }
}

/// Decode params into a typed command, run it and encode the response.
async fn dispatch<C, F, Fut>(params: serde_json::Value, handler: F) -> String
where
    C: ProviderCommand + DeserializeOwned,
    C::Response: Serialize,
    F: FnOnce(C) -> Fut,
    Fut: Future<Output = Result<C::Response>>,
{
    let cmd: C = match serde_json::from_value(params) {
        Ok(cmd) => cmd,
        Err(e) => return Response::error(&format!("Invalid params: {e}")),
    };

    match handler(cmd).await {
        Ok(data) => Response::success(data),
        Err(e) => match e.downcast_ref::<TaskNotFound>() {
            Some(TaskNotFound(task_id)) => Response::not_found(task_id),
            None => Response::error(&format!("{e:#}")),
        },
    }
}
