use crate::errors::{AgentError, AgentResult};
use a2a_types::{Message, Task, TaskPushNotificationConfig, TaskState, TaskStatus};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use super::task_store::TaskStore;

/// In-memory implementation of [`TaskStore`].
///
/// Tasks and push notification configs live in two `DashMap`s keyed by task
/// id. Single-key operations lock only the shard holding that key, so
/// unrelated tasks never contend.
///
/// Nothing is ever evicted and nothing survives a restart; use a durable
/// backend for production deployments.
pub struct InMemoryTaskStore {
    tasks: DashMap<String, Task>,
    push_configs: DashMap<String, TaskPushNotificationConfig>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        tracing::debug!("InMemoryTaskStore created; tasks are not persisted across restarts");

        Self {
            tasks: DashMap::new(),
            push_configs: DashMap::new(),
        }
    }

    /// Number of stored tasks.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn get_task(&self, task_id: &str) -> AgentResult<Option<Task>> {
        Ok(self.tasks.get(task_id).map(|entry| entry.value().clone()))
    }

    async fn set_task(&self, task: &Task) -> AgentResult<()> {
        self.tasks.insert(task.id.clone(), task.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        task_id: &str,
        state: TaskState,
        message: Option<Message>,
    ) -> AgentResult<TaskStatus> {
        let mut entry = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| AgentError::task_not_found(task_id))?;

        let now = Utc::now();
        let timestamp = match entry.status.timestamp {
            Some(previous) if previous > now => previous,
            _ => now,
        };

        let status = TaskStatus {
            state,
            message,
            timestamp: Some(timestamp),
        };
        entry.status = status.clone();
        Ok(status)
    }

    async fn get_push_notification_config(
        &self,
        task_id: &str,
    ) -> AgentResult<Option<TaskPushNotificationConfig>> {
        Ok(self
            .push_configs
            .get(task_id)
            .map(|entry| entry.value().clone()))
    }

    async fn set_push_notification_config(
        &self,
        config: &TaskPushNotificationConfig,
    ) -> AgentResult<()> {
        self.push_configs
            .insert(config.task_id.clone(), config.clone());
        Ok(())
    }

    async fn delete_push_notification_config(&self, task_id: &str) -> AgentResult<bool> {
        Ok(self.push_configs.remove(task_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a2a_types::{Artifact, Part, PushNotificationConfig};

    #[tokio::test]
    async fn test_set_task_twice_keeps_second_payload() {
        let store = InMemoryTaskStore::new();

        let mut first = Task::new("task-1", "ctx-1");
        first.history.push(Message::user_text("first"));
        first
            .artifacts
            .push(Artifact::new("a-1", vec![Part::text("only in first")]));
        store.set_task(&first).await.unwrap();

        let mut second = Task::new("task-1", "ctx-2");
        second.history.push(Message::user_text("second"));
        store.set_task(&second).await.unwrap();

        let stored = store.get_task("task-1").await.unwrap().unwrap();
        assert_eq!(stored, second);
        assert!(stored.artifacts.is_empty());
        assert_eq!(store.task_count(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_task() {
        let store = InMemoryTaskStore::new();
        assert!(store.get_task("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_status() {
        let store = InMemoryTaskStore::new();
        store.set_task(&Task::new("task-1", "ctx-1")).await.unwrap();

        let status = store
            .update_status("task-1", TaskState::Working, Some(Message::agent_text("on it")))
            .await
            .unwrap();
        assert_eq!(status.state, TaskState::Working);

        let stored = store.get_task("task-1").await.unwrap().unwrap();
        assert_eq!(stored.status, status);
        assert_eq!(stored.status.message.unwrap().text(), "on it");
    }

    #[tokio::test]
    async fn test_update_status_missing_task() {
        let store = InMemoryTaskStore::new();
        let err = store
            .update_status("missing", TaskState::Working, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::TaskNotFound { task_id } if task_id == "missing"));
    }

    #[tokio::test]
    async fn test_status_timestamps_never_decrease() {
        let store = InMemoryTaskStore::new();
        let mut task = Task::new("task-1", "ctx-1");
        // A timestamp from the future must not be overtaken by a smaller one.
        let future = Utc::now() + chrono::Duration::hours(1);
        task.status.timestamp = Some(future);
        store.set_task(&task).await.unwrap();

        let status = store
            .update_status("task-1", TaskState::Working, None)
            .await
            .unwrap();
        assert_eq!(status.timestamp, Some(future));

        let mut last = status.timestamp;
        for state in [TaskState::InputRequired, TaskState::Working, TaskState::Completed] {
            let status = store.update_status("task-1", state, None).await.unwrap();
            assert!(status.timestamp >= last);
            last = status.timestamp;
        }
    }

    #[tokio::test]
    async fn test_push_config_lifecycle_is_independent_of_tasks() {
        let store = InMemoryTaskStore::new();
        let config = TaskPushNotificationConfig::new(
            "not-yet-created",
            PushNotificationConfig::new("https://hooks.example.com"),
        );

        store.set_push_notification_config(&config).await.unwrap();
        assert_eq!(
            store
                .get_push_notification_config("not-yet-created")
                .await
                .unwrap(),
            Some(config)
        );

        assert!(store
            .delete_push_notification_config("not-yet-created")
            .await
            .unwrap());
        assert!(!store
            .delete_push_notification_config("not-yet-created")
            .await
            .unwrap());
        assert!(store
            .get_push_notification_config("not-yet-created")
            .await
            .unwrap()
            .is_none());
    }
}
