use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use super::{TaskEventQueue, TaskEventStream};

/// Task id to live event queue.
///
/// A queue leaves the registry when one of its readers receives the final
/// event, or `retention` after the final event was pushed if nobody reads it.
/// Removal only ever targets the queue that was registered at the time, so a
/// newer queue for the same task is never evicted by an older one.
#[derive(Clone)]
pub struct EventQueueRegistry {
    queues: Arc<DashMap<String, Arc<TaskEventQueue>>>,
    retention: Duration,
}

impl EventQueueRegistry {
    pub fn new(retention: Duration) -> Self {
        Self {
            queues: Arc::new(DashMap::new()),
            retention,
        }
    }

    /// Register a fresh queue for the task. A queue it displaces is shut so
    /// its readers finish instead of waiting forever.
    pub fn register(&self, task_id: &str) -> Arc<TaskEventQueue> {
        let queue = Arc::new(TaskEventQueue::new(task_id));
        if let Some(previous) = self.queues.insert(task_id.to_string(), Arc::clone(&queue)) {
            tracing::debug!(task_id, "Replacing event queue of resubmitted task");
            previous.shut();
        }
        queue
    }

    pub fn get(&self, task_id: &str) -> Option<Arc<TaskEventQueue>> {
        self.queues.get(task_id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.queues.contains_key(task_id)
    }

    pub fn len(&self) -> usize {
        self.queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    /// Unregister and shut whatever queue `task_id` has.
    pub fn remove(&self, task_id: &str) -> Option<Arc<TaskEventQueue>> {
        let (_, queue) = self.queues.remove(task_id)?;
        queue.shut();
        Some(queue)
    }

    /// Remove `queue` if it is still the one registered for its task.
    pub fn remove_queue(&self, queue: &Arc<TaskEventQueue>) -> bool {
        self.queues
            .remove_if(queue.task_id(), |_, current| Arc::ptr_eq(current, queue))
            .is_some()
    }

    /// Reader over the registered queue of `task_id`, if any.
    pub fn subscribe(&self, task_id: &str, cancel: CancellationToken) -> Option<TaskEventStream> {
        let queue = self.get(task_id)?;
        Some(self.reader(queue, cancel))
    }

    /// Reader that unregisters `queue` when it hands out the final event.
    pub fn reader(&self, queue: Arc<TaskEventQueue>, cancel: CancellationToken) -> TaskEventStream {
        let registry = self.clone();
        let mut inner = queue.subscribe(cancel);

        Box::pin(async_stream::stream! {
            while let Some(event) = inner.next().await {
                if event.is_final() && registry.remove_queue(&queue) {
                    tracing::debug!(task_id = %queue.task_id(), "Event queue drained and removed");
                }
                yield event;
            }
        })
    }

    /// Evict `queue` after the retention window unless a reader drained it first.
    pub fn schedule_eviction(&self, queue: Arc<TaskEventQueue>) {
        if self.retention.is_zero() {
            self.remove_queue(&queue);
            return;
        }

        let registry = self.clone();
        let retention = self.retention;
        tokio::spawn(async move {
            tokio::time::sleep(retention).await;
            if registry.remove_queue(&queue) {
                tracing::debug!(
                    task_id = %queue.task_id(),
                    pending = queue.pending(),
                    "Evicted undrained event queue"
                );
            }
        });
    }
}

impl Default for EventQueueRegistry {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TaskEvent;
    use a2a_types::{TaskState, TaskStatus, TaskStatusUpdateEvent};

    fn status(task_id: &str, state: TaskState, is_final: bool) -> TaskEvent {
        TaskStatusUpdateEvent::new(task_id, "ctx", TaskStatus::new(state), is_final).into()
    }

    #[tokio::test]
    async fn test_drained_queue_is_removed() {
        let registry = EventQueueRegistry::default();
        let queue = registry.register("task-1");
        queue.notify_event(status("task-1", TaskState::Working, false)).unwrap();
        queue.notify_final_event(status("task-1", TaskState::Completed, true)).unwrap();

        let stream = registry.subscribe("task-1", CancellationToken::new()).unwrap();
        let events: Vec<_> = stream.collect().await;

        assert_eq!(events.len(), 2);
        assert!(!registry.contains("task-1"));
        assert!(registry.subscribe("task-1", CancellationToken::new()).is_none());
    }

    #[tokio::test]
    async fn test_register_replaces_and_shuts_previous_queue() {
        let registry = EventQueueRegistry::default();
        let old = registry.register("task-1");
        let new = registry.register("task-1");

        assert!(old.is_closed());
        assert!(!new.is_closed());
        assert!(Arc::ptr_eq(&registry.get("task-1").unwrap(), &new));

        // An old reader finishing must not unregister the new queue.
        assert!(!registry.remove_queue(&old));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_shuts_queue_and_ends_readers() {
        let registry = EventQueueRegistry::default();
        let queue = registry.register("task-1");
        queue.notify_event(status("task-1", TaskState::Working, false)).unwrap();
        let stream = registry.subscribe("task-1", CancellationToken::new()).unwrap();

        let removed = registry.remove("task-1").unwrap();
        assert!(removed.is_closed());
        assert!(registry.remove("task-1").is_none());

        // Already queued events are still delivered before the stream ends.
        let events: Vec<_> = stream.collect().await;
        assert_eq!(events.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_undrained_final_queue_is_evicted_after_retention() {
        let registry = EventQueueRegistry::new(Duration::from_secs(30));
        let queue = registry.register("task-1");
        queue.notify_final_event(status("task-1", TaskState::Failed, true)).unwrap();
        registry.schedule_eviction(Arc::clone(&queue));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(registry.contains("task-1"));

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_zero_retention_evicts_immediately() {
        let registry = EventQueueRegistry::new(Duration::ZERO);
        let queue = registry.register("task-1");
        registry.schedule_eviction(queue);
        assert!(registry.is_empty());
    }
}
