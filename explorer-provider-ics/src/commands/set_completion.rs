use anyhow::Result;
use explorer_core::mirror::protocol::SetCompletion;

use crate::remote_config::IcsRemoteConfig;
use crate::task_dir::TaskDir;

pub async fn handle(cmd: SetCompletion) -> Result<()> {
    let config = IcsRemoteConfig::try_from(&cmd.remote_config)?;
    config.require_access()?;

    let file = TaskDir::new(&config).locate(&cmd.task_id)?;
    if file.todo.task.completed == cmd.completed {
        return Ok(());
    }

    let mut task = file.todo.task.clone();
    task.completed = cmd.completed;
    file.rewrite(&task)
}
