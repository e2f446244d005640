//! Per-reminder mutual exclusion.
//!
//! Operations on the same reminder id run one at a time; operations on
//! different ids never wait on each other. Entries are dropped once no
//! one holds or waits for them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct IdLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl IdLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `id`.
    pub async fn lock(&self, id: &str) -> IdGuard<'_> {
        let slot = {
            let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
            Arc::clone(locks.entry(id.to_string()).or_default())
        };

        let guard = slot.lock_owned().await;

        IdGuard {
            registry: self,
            id: id.to_string(),
            guard: Some(guard),
        }
    }

    /// Number of ids currently held or waited on.
    pub fn active(&self) -> usize {
        self.locks.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}

pub struct IdGuard<'a> {
    registry: &'a IdLocks,
    id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for IdGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut locks = self.registry.locks.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(slot) = locks.get(&self.id)
            && Arc::strong_count(slot) == 1
        {
            locks.remove(&self.id);
        }
    }
}
