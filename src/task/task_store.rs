use crate::errors::AgentResult;
use a2a_types::{Message, Task, TaskPushNotificationConfig, TaskState, TaskStatus};
use async_trait::async_trait;

/// Persistence for task records and push notification configs.
///
/// The store is pure data access: it applies no lifecycle policy. Both record
/// kinds are keyed by task id and have independent lifecycles, so a push
/// config may be stored before its task exists or outlive it.
///
/// Concurrency contract:
/// - each method is atomic for its key;
/// - `set_task` is a plain upsert, concurrent writers of one id race with
///   last-write-wins. Callers that read, modify and write back a task must
///   serialize per task id themselves (the `TaskManager` does).
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Retrieve a task by id. `None` if it was never stored.
    async fn get_task(&self, task_id: &str) -> AgentResult<Option<Task>>;

    /// Insert or replace the task stored under `task.id`.
    ///
    /// The stored record is exactly `task`; nothing from a previous record
    /// with the same id is merged in.
    async fn set_task(&self, task: &Task) -> AgentResult<()>;

    /// Replace the status of an existing task and return the new status.
    ///
    /// The timestamp is set to the current time, or to the previous status
    /// timestamp if the clock went backwards, so timestamps never decrease.
    ///
    /// Fails with `AgentError::TaskNotFound` if the task does not exist.
    async fn update_status(
        &self,
        task_id: &str,
        state: TaskState,
        message: Option<Message>,
    ) -> AgentResult<TaskStatus>;

    /// Retrieve the push notification config for a task.
    async fn get_push_notification_config(
        &self,
        task_id: &str,
    ) -> AgentResult<Option<TaskPushNotificationConfig>>;

    /// Insert or replace the push notification config for `config.task_id`.
    async fn set_push_notification_config(
        &self,
        config: &TaskPushNotificationConfig,
    ) -> AgentResult<()>;

    /// Remove the push notification config for a task.
    /// Returns whether a config was present.
    async fn delete_push_notification_config(&self, task_id: &str) -> AgentResult<bool>;
}
