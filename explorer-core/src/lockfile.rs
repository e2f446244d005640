//! Exclusive locks for state files rewritten by more than one process.
//!
//! The CLI and `explorer-notify` both rewrite the notification queue, and
//! two CLI runs can rewrite the pending-sync queue at once. Every
//! load-modify-save cycle on such a file holds its sidecar `.lock`.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::ExplorerResult;

/// Released when dropped.
pub(crate) struct FileLock {
    _file: File,
}

impl FileLock {
    /// Block until the lock beside `path` is ours.
    pub(crate) fn acquire(path: &Path) -> ExplorerResult<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(lock_path(path))?;
        file.lock_exclusive()?;

        Ok(FileLock { _file: file })
    }
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}
