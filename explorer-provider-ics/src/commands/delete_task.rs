use anyhow::Result;
use explorer_core::mirror::protocol::DeleteTask;

use crate::remote_config::IcsRemoteConfig;
use crate::task_dir::TaskDir;

pub async fn handle(cmd: DeleteTask) -> Result<()> {
    let config = IcsRemoteConfig::try_from(&cmd.remote_config)?;
    config.require_access()?;

    TaskDir::new(&config).locate(&cmd.task_id)?.remove()
}
