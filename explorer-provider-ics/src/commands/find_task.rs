//! Look a task up by the correlation tag in its notes.

use anyhow::Result;
use explorer_core::mirror::FoundTask;
use explorer_core::mirror::protocol::FindTask;

use crate::remote_config::IcsRemoteConfig;
use crate::task_dir::TaskDir;

pub async fn handle(cmd: FindTask) -> Result<Option<FoundTask>> {
    let config = IcsRemoteConfig::try_from(&cmd.remote_config)?;
    TaskDir::new(&config).find_by_tag(&cmd.tag)
}
