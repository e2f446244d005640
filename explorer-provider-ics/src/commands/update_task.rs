//! Replace a task's contents.
//!
//! The file is regenerated whole, so the old alarm never survives next to
//! the new one.

use anyhow::Result;
use explorer_core::mirror::protocol::UpdateTask;

use crate::remote_config::IcsRemoteConfig;
use crate::task_dir::TaskDir;

pub async fn handle(cmd: UpdateTask) -> Result<()> {
    let config = IcsRemoteConfig::try_from(&cmd.remote_config)?;
    config.require_access()?;

    TaskDir::new(&config).locate(&cmd.task_id)?.rewrite(&cmd.task)
}
