//! Grant access unless the config says otherwise.
//!
//! Granting sets up the directory layout, so the first create has a list
//! to land in.

use anyhow::Result;
use explorer_core::mirror::protocol::RequestAccess;

use crate::remote_config::{Access, IcsRemoteConfig};
use crate::task_dir::TaskDir;

pub async fn handle(cmd: RequestAccess) -> Result<bool> {
    let config = IcsRemoteConfig::try_from(&cmd.remote_config)?;

    if config.ics_access == Access::Denied {
        return Ok(false);
    }

    TaskDir::new(&config).ensure_layout()?;
    Ok(true)
}
