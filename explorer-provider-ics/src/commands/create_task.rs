use anyhow::Result;
use explorer_core::mirror::protocol::CreateTask;

use crate::remote_config::IcsRemoteConfig;
use crate::task_dir::TaskDir;

pub async fn handle(cmd: CreateTask) -> Result<String> {
    let config = IcsRemoteConfig::try_from(&cmd.remote_config)?;
    config.require_access()?;

    TaskDir::new(&config).create(&cmd.list_id, &cmd.task)
}
