use anyhow::Result;
use explorer_core::mirror::TaskList;
use explorer_core::mirror::protocol::ListLists;

use crate::remote_config::IcsRemoteConfig;
use crate::task_dir::TaskDir;

pub async fn handle(cmd: ListLists) -> Result<Vec<TaskList>> {
    let config = IcsRemoteConfig::try_from(&cmd.remote_config)?;
    TaskDir::new(&config).lists()
}
