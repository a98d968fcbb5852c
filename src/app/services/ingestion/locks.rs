//! Per-dataset-name mutual exclusion
//!
//! At most one ingestion per name is in flight inside this process. Entries
//! are removed once no holder or waiter references them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OwnedMutexGuard;
use tracing::trace;

type LockMap = HashMap<String, Arc<tokio::sync::Mutex<()>>>;

#[derive(Debug, Clone, Default)]
pub struct DatasetLocks {
    inner: Arc<Mutex<LockMap>>,
}

impl DatasetLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `dataset_name`
    pub async fn acquire(&self, dataset_name: &str) -> DatasetLockGuard {
        let mutex = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            map.entry(dataset_name.to_string()).or_default().clone()
        };

        let guard = mutex.lock_owned().await;
        trace!("Acquired lock for '{}'", dataset_name);

        DatasetLockGuard {
            dataset_name: dataset_name.to_string(),
            locks: self.clone(),
            _guard: guard,
        }
    }

    /// Number of names currently held or awaited
    pub fn tracked(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Exclusive access to one dataset name, released on drop
#[derive(Debug)]
pub struct DatasetLockGuard {
    dataset_name: String,
    locks: DatasetLocks,
    _guard: OwnedMutexGuard<()>,
}

impl DatasetLockGuard {
    pub fn dataset_name(&self) -> &str {
        &self.dataset_name
    }
}

impl Drop for DatasetLockGuard {
    fn drop(&mut self) {
        let mut map = self
            .locks
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Only the map and this guard still reference the mutex
        if map
            .get(&self.dataset_name)
            .is_some_and(|mutex| Arc::strong_count(mutex) <= 2)
        {
            map.remove(&self.dataset_name);
        }
        trace!("Released lock for '{}'", self.dataset_name);
    }
}
