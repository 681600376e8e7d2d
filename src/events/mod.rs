//! Live task updates.
//!
//! Every status or artifact mutation made through the
//! [`TaskManager`](crate::task::TaskManager) while a stream is registered for
//! the task becomes a [`TaskEvent`] pushed into that task's
//! [`TaskEventQueue`]. Transports read the queue as a [`TaskEventStream`].

pub mod event_queue;
pub mod registry;

pub use event_queue::TaskEventQueue;
pub use registry::EventQueueRegistry;

use a2a_types::{SendStreamingMessageResult, TaskArtifactUpdateEvent, TaskStatusUpdateEvent};
use futures::Stream;
use std::pin::Pin;

/// Stream of events for one task. Ends after the final event or on cancellation.
pub type TaskEventStream = Pin<Box<dyn Stream<Item = TaskEvent> + Send>>;

/// A non-persisted notification about one task mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    StatusUpdate(TaskStatusUpdateEvent),
    ArtifactUpdate(TaskArtifactUpdateEvent),
}

impl TaskEvent {
    pub fn task_id(&self) -> &str {
        match self {
            TaskEvent::StatusUpdate(event) => &event.task_id,
            TaskEvent::ArtifactUpdate(event) => &event.task_id,
        }
    }

    /// Only status updates can be final.
    pub fn is_final(&self) -> bool {
        matches!(self, TaskEvent::StatusUpdate(event) if event.is_final)
    }
}

impl From<TaskStatusUpdateEvent> for TaskEvent {
    fn from(event: TaskStatusUpdateEvent) -> Self {
        TaskEvent::StatusUpdate(event)
    }
}

impl From<TaskArtifactUpdateEvent> for TaskEvent {
    fn from(event: TaskArtifactUpdateEvent) -> Self {
        TaskEvent::ArtifactUpdate(event)
    }
}

impl From<TaskEvent> for SendStreamingMessageResult {
    fn from(event: TaskEvent) -> Self {
        match event {
            TaskEvent::StatusUpdate(event) => SendStreamingMessageResult::TaskStatusUpdate(event),
            TaskEvent::ArtifactUpdate(event) => {
                SendStreamingMessageResult::TaskArtifactUpdate(event)
            }
        }
    }
}
