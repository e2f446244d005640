pub mod add;
pub mod config;
pub mod delete;
pub mod done;
pub mod edit;
pub mod list;
pub mod sync;

use anyhow::Result;
use explorer_core::ReminderManager;
use explorer_core::config::Config;
use explorer_core::sync::SyncIssue;
use tracing::debug;

use crate::render::Render;

/// A manager plus what the commands need to know about how it was set up.
pub struct App {
    pub manager: ReminderManager,
    mirrored: bool,
}

impl App {
    pub fn open(config: &Config) -> Result<Self> {
        debug!(data_dir = %config.data_path().display(), "opening reminder manager");
        Ok(App {
            manager: ReminderManager::from_config(config)?,
            mirrored: config.mirror.is_some(),
        })
    }

    /// Print mirror problems, leaving out the denial every write gets when no
    /// mirror is configured.
    pub fn report(&self, issues: &[SyncIssue]) {
        for issue in issues {
            if !self.mirrored && *issue == SyncIssue::AccessDenied {
                continue;
            }
            eprintln!("{}", issue.render());
        }
    }
}
