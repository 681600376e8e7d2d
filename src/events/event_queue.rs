use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use super::{TaskEvent, TaskEventStream};
use crate::errors::{AgentError, AgentResult};

/// Ordered, exactly-once event delivery for a single task.
///
/// Producers push with [`notify_event`](Self::notify_event) and
/// [`notify_final_event`](Self::notify_final_event) and never wait. Consumers
/// read through [`subscribe`](Self::subscribe). All streams of one queue pull
/// from the same FIFO, so every event is delivered to exactly one reader.
///
/// The semaphore holds one permit per queued, undelivered event. The final
/// event closes the semaphore instead of adding a permit, which wakes every
/// waiting reader; readers then drain what is left and finish.
pub struct TaskEventQueue {
    task_id: String,
    items: Mutex<VecDeque<TaskEvent>>,
    available: Semaphore,
    closed: AtomicBool,
    finalized: AtomicBool,
}

impl TaskEventQueue {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            items: Mutex::new(VecDeque::new()),
            available: Semaphore::new(0),
            closed: AtomicBool::new(false),
            finalized: AtomicBool::new(false),
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// True once the final event was pushed or the queue was shut.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// True once the final event was pushed. A queue closed by
    /// [`shut`](Self::shut) never becomes finalized.
    pub fn is_finalized(&self) -> bool {
        self.finalized.load(Ordering::Acquire)
    }

    /// Events waiting for a reader.
    pub fn pending(&self) -> usize {
        self.lock_items().len()
    }

    /// Enqueue a non-terminal event.
    pub fn notify_event(&self, event: TaskEvent) -> AgentResult<()> {
        self.push(event, false)
    }

    /// Enqueue the terminal event. Later notifications fail with
    /// [`AgentError::StreamClosed`].
    pub fn notify_final_event(&self, event: TaskEvent) -> AgentResult<()> {
        self.push(event, true)
    }

    /// Close without a final event; readers drain and end.
    pub fn shut(&self) {
        let _items = self.lock_items();
        self.closed.store(true, Ordering::Release);
        self.available.close();
    }

    fn push(&self, event: TaskEvent, terminal: bool) -> AgentResult<()> {
        {
            let mut items = self.lock_items();
            if self.closed.load(Ordering::Acquire) {
                tracing::warn!(
                    task_id = %self.task_id,
                    terminal,
                    "Dropping event for a closed task stream"
                );
                return Err(AgentError::StreamClosed {
                    task_id: self.task_id.clone(),
                });
            }
            items.push_back(event);
            if terminal {
                self.closed.store(true, Ordering::Release);
                self.finalized.store(true, Ordering::Release);
            }
        }

        if terminal {
            self.available.close();
        } else {
            self.available.add_permits(1);
        }
        Ok(())
    }

    fn pop(&self) -> Option<TaskEvent> {
        self.lock_items().pop_front()
    }

    fn lock_items(&self) -> MutexGuard<'_, VecDeque<TaskEvent>> {
        // The guarded section never panics, so a poisoned lock still holds a consistent queue.
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A fresh reader over this queue.
    ///
    /// The stream suspends while the queue is empty and open, ends once the
    /// queue is closed and drained, and ends early when `cancel` fires.
    pub fn subscribe(self: &Arc<Self>, cancel: CancellationToken) -> TaskEventStream {
        let queue = Arc::clone(self);

        Box::pin(async_stream::stream! {
            loop {
                let acquired = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    permit = queue.available.acquire() => Some(permit),
                };

                let Some(acquired) = acquired else {
                    tracing::debug!(task_id = %queue.task_id, "Task event stream cancelled");
                    break;
                };

                match acquired {
                    Ok(permit) => {
                        permit.forget();
                        if let Some(event) = queue.pop() {
                            yield event;
                        }
                    }
                    Err(_closed) => {
                        while let Some(event) = queue.pop() {
                            yield event;
                        }
                        break;
                    }
                }
            }
        })
    }
}

impl std::fmt::Debug for TaskEventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskEventQueue")
            .field("task_id", &self.task_id)
            .field("pending", &self.pending())
            .field("closed", &self.is_closed())
            .finish()
    }
}
