use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per task id.
///
/// Entries are created on first use and dropped by the last guard released
/// while nobody else holds or waits for the same id.
#[derive(Clone, Default)]
pub struct TaskLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl TaskLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `task_id`.
    pub async fn lock(&self, task_id: &str) -> TaskLockGuard {
        let mutex = Arc::clone(
            self.locks
                .entry(task_id.to_string())
                .or_default()
                .value(),
        );
        let guard = mutex.lock_owned().await;

        TaskLockGuard {
            guard: Some(guard),
            locks: Arc::clone(&self.locks),
            task_id: task_id.to_string(),
        }
    }

    /// Number of task ids that currently have a lock entry.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive access to one task id until dropped.
pub struct TaskLockGuard {
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    task_id: String,
}

impl Drop for TaskLockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map itself still references the mutex: no holder, no waiter.
        self.locks
            .remove_if(&self.task_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
