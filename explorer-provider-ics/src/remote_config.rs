//! ICS-specific remote configuration.
//!
//! The `[mirror]` table in explorer's config is passed through untyped;
//! this gives it a shape on the provider side.

use std::path::PathBuf;

use anyhow::{Result, anyhow, bail};

/// List created when `ics_dir` has none yet and no default is configured.
pub const FALLBACK_LIST: &str = "Reminders";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Denied,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IcsRemoteConfig {
    pub ics_dir: PathBuf,
    pub ics_default_list: Option<String>,
    pub ics_access: Access,
}

impl IcsRemoteConfig {
    pub fn require_access(&self) -> Result<()> {
        if self.ics_access == Access::Denied {
            bail!("Access to {} was denied", self.ics_dir.display());
        }
        Ok(())
    }
}

impl TryFrom<&serde_json::Map<String, serde_json::Value>> for IcsRemoteConfig {
    type Error = anyhow::Error;

    fn try_from(map: &serde_json::Map<String, serde_json::Value>) -> Result<Self> {
        let ics_dir = map
            .get("ics_dir")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("Missing required field: ics_dir"))?;
        let ics_dir = PathBuf::from(shellexpand::tilde(ics_dir).into_owned());

        let ics_default_list = map
            .get("ics_default_list")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let ics_access = match map.get("ics_access").and_then(|v| v.as_str()) {
            None | Some("granted") => Access::Granted,
            Some("denied") => Access::Denied,
            Some(other) => {
                bail!("Invalid ics_access '{other}': expected \"granted\" or \"denied\"")
            }
        };

        Ok(Self {
            ics_dir,
            ics_default_list,
            ics_access,
        })
    }
}
