use std::sync::Arc;

use a2a_types::{
    AgentCard, Artifact, Message, MessageSendParams, SendMessageResult, Task,
    TaskArtifactUpdateEvent, TaskPushNotificationConfig, TaskQueryParams, TaskState, TaskStatus,
    TaskStatusUpdateEvent,
};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use super::locks::TaskLocks;
use super::task_store::TaskStore;
use crate::agents::{AgentHandler, NoopAgent};
use crate::config::{TaskManagerConfig, TransitionPolicy};
use crate::errors::{AgentError, AgentResult};
use crate::events::{EventQueueRegistry, TaskEvent, TaskEventQueue, TaskEventStream};

/// Task lifecycle orchestration.
///
/// TaskManager turns protocol operations into store reads and writes, agent
/// hook invocations and live events. It is a cheap handle: clones share the
/// store, the agent, the event queues and the per-task locks.
///
/// Guarantees:
/// - every fetch, mutate and persist sequence for one task id runs under that
///   task's lock, so concurrent messages never lose history entries;
/// - a mutation is persisted before the matching hook runs or event is emitted;
/// - no task lock is held while an agent hook runs, so hooks may re-enter.
#[derive(Clone)]
pub struct TaskManager {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn TaskStore>,
    agent: Arc<dyn AgentHandler>,
    queues: EventQueueRegistry,
    locks: TaskLocks,
    config: TaskManagerConfig,
}

/// Builder for [`TaskManager`].
pub struct TaskManagerBuilder {
    store: Arc<dyn TaskStore>,
    agent: Arc<dyn AgentHandler>,
    config: TaskManagerConfig,
}

impl TaskManagerBuilder {
    pub fn with_agent(mut self, agent: impl AgentHandler + 'static) -> Self {
        self.agent = Arc::new(agent);
        self
    }

    pub fn with_shared_agent(mut self, agent: Arc<dyn AgentHandler>) -> Self {
        self.agent = agent;
        self
    }

    pub fn with_config(mut self, config: TaskManagerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> TaskManager {
        TaskManager {
            inner: Arc::new(Inner {
                store: self.store,
                agent: self.agent,
                queues: EventQueueRegistry::new(self.config.stream_retention()),
                locks: TaskLocks::new(),
                config: self.config,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum TaskHook {
    Created,
    Updated,
}

impl TaskHook {
    fn name(self) -> &'static str {
        match self {
            TaskHook::Created => "on_task_created",
            TaskHook::Updated => "on_task_updated",
        }
    }
}

impl TaskManager {
    /// Manager with the [`NoopAgent`] and default config.
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self::builder(store).build()
    }

    pub fn builder(store: Arc<dyn TaskStore>) -> TaskManagerBuilder {
        TaskManagerBuilder {
            store,
            agent: Arc::new(NoopAgent),
            config: TaskManagerConfig::default(),
        }
    }

    pub fn store(&self) -> &Arc<dyn TaskStore> {
        &self.inner.store
    }

    pub fn config(&self) -> &TaskManagerConfig {
        &self.inner.config
    }

    /// Whether a live event stream is registered for the task.
    pub fn has_event_stream(&self, task_id: &str) -> bool {
        self.inner.queues.contains(task_id)
    }

    /// Create and persist a new task.
    ///
    /// Returns a Task with:
    /// - a fresh UUID id
    /// - the given context id, or a fresh one
    /// - `submitted` status stamped with the current time
    /// - empty history and artifacts
    pub async fn create_task(&self, context_id: Option<String>) -> AgentResult<Task> {
        let task_id = Uuid::new_v4().to_string();
        let context_id = context_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let task = Task::new(task_id, context_id);

        self.inner.store.set_task(&task).await?;
        tracing::debug!(task_id = %task.id, context_id = %task.context_id, "Task created");
        Ok(task)
    }

    /// Handle an incoming message.
    ///
    /// Exactly one of three paths runs:
    /// 1. the message names a task: append it to that task's history and call
    ///    `on_task_updated`;
    /// 2. no task id and the agent answers stateless messages: return the
    ///    agent's reply, no task is created;
    /// 3. otherwise create a task seeded with the message and call
    ///    `on_task_created`.
    ///
    /// Hook errors are returned to the caller; the task keeps whatever state
    /// was persisted before the hook failed.
    pub async fn send_message(&self, params: MessageSendParams) -> AgentResult<SendMessageResult> {
        let history_length = params.history_length();

        if params.message.task_id.is_none() && self.inner.agent.handles_stateless_messages() {
            tracing::debug!(message_id = %params.message.message_id, "Answering stateless message");
            let reply = self.inner.agent.on_message_received(self, params).await?;
            return Ok(SendMessageResult::Message(reply));
        }

        let (task, hook) = self.resolve_task(params.message).await?;
        let task_id = task.id.clone();
        match hook {
            TaskHook::Created => self.inner.agent.on_task_created(self, task).await?,
            TaskHook::Updated => self.inner.agent.on_task_updated(self, task).await?,
        }

        let mut task = self.fetch_task(&task_id).await?;
        if let Some(length) = history_length {
            task.truncate_history(length);
        }
        Ok(SendMessageResult::Task(task))
    }

    /// Handle an incoming message and stream the resulting task events.
    ///
    /// The task is resolved like [`send_message`](Self::send_message) paths 1
    /// and 3. A fresh event queue is registered before the hook starts on a
    /// background task, and its stream is returned right away. If the hook
    /// fails or panics before emitting a final event, the task is marked
    /// `failed` and that status ends the stream. A hook that returns without
    /// a final event ends the stream with the task's persisted status.
    pub async fn send_subscribe(
        &self,
        params: MessageSendParams,
        cancel: CancellationToken,
    ) -> AgentResult<TaskEventStream> {
        let (task, hook) = self.resolve_task(params.message).await?;
        let queue = self.inner.queues.register(&task.id);
        let stream = self.inner.queues.reader(Arc::clone(&queue), cancel);

        self.spawn_hook(hook, task, queue);
        Ok(stream)
    }

    /// Attach to the live event stream of a task.
    pub fn resubscribe(&self, task_id: &str, cancel: CancellationToken) -> AgentResult<TaskEventStream> {
        self.inner
            .queues
            .subscribe(task_id, cancel)
            .ok_or_else(|| AgentError::StreamNotFound {
                task_id: task_id.to_string(),
            })
    }

    /// Cancel a task and notify the agent.
    ///
    /// Work already running for the task is not interrupted; the agent is
    /// expected to notice the `canceled` state. A live stream receives a final
    /// `canceled` status.
    pub async fn cancel_task(&self, task_id: &str) -> AgentResult<Task> {
        {
            let _guard = self.inner.locks.lock(task_id).await;
            let task = self.fetch_task(task_id).await?;

            if self.inner.config.transition_policy == TransitionPolicy::Strict
                && task.status.state.is_terminal()
            {
                return Err(AgentError::TaskNotCancelable {
                    task_id: task_id.to_string(),
                    state: task.status.state,
                });
            }

            let status = self
                .inner
                .store
                .update_status(task_id, TaskState::Canceled, None)
                .await?;
            self.emit(TaskStatusUpdateEvent::new(task_id, &task.context_id, status, true).into());
        }

        tracing::info!(task_id, "Task canceled");
        let task = self.fetch_task(task_id).await?;
        self.inner.agent.on_task_cancelled(self, task).await?;
        self.fetch_task(task_id).await
    }

    /// Read a task, keeping at most `history_length` recent messages.
    pub async fn get_task(&self, params: TaskQueryParams) -> AgentResult<Task> {
        let mut task = self.fetch_task(&params.id).await?;
        if let Some(length) = params.history_length {
            task.truncate_history(length as usize);
        }
        Ok(task)
    }

    /// Write a new status and emit it to a live stream.
    ///
    /// A `final_event` ends the stream; later events for the same stream are
    /// dropped with a warning.
    pub async fn update_status(
        &self,
        task_id: &str,
        state: TaskState,
        message: Option<Message>,
        final_event: bool,
    ) -> AgentResult<TaskStatus> {
        let _guard = self.inner.locks.lock(task_id).await;
        let task = self.fetch_task(task_id).await?;

        if self.inner.config.transition_policy == TransitionPolicy::Strict
            && task.status.state.is_terminal()
        {
            return Err(AgentError::InvalidTaskStateTransition {
                task_id: task_id.to_string(),
                from: task.status.state,
                to: state,
            });
        }

        let status = self.inner.store.update_status(task_id, state, message).await?;
        tracing::debug!(task_id, state = %state, final_event, "Task status updated");

        self.emit(
            TaskStatusUpdateEvent::new(task_id, &task.context_id, status.clone(), final_event).into(),
        );
        Ok(status)
    }

    /// Attach a complete artifact to the task and emit it to a live stream.
    pub async fn return_artifact(&self, task_id: &str, artifact: Artifact) -> AgentResult<()> {
        let _guard = self.inner.locks.lock(task_id).await;
        let mut task = self.fetch_task(task_id).await?;

        task.artifacts.push(artifact.clone());
        self.inner.store.set_task(&task).await?;
        tracing::debug!(task_id, artifact_id = %artifact.artifact_id, "Artifact returned");

        self.emit(TaskArtifactUpdateEvent::new(task_id, &task.context_id, artifact).into());
        Ok(())
    }

    /// Attach one chunk of an artifact.
    ///
    /// With `append`, the parts extend the stored artifact with the same id
    /// when there is one. Otherwise the chunk is stored as a new artifact.
    pub async fn return_artifact_chunk(
        &self,
        task_id: &str,
        artifact: Artifact,
        append: bool,
        last_chunk: bool,
    ) -> AgentResult<()> {
        let _guard = self.inner.locks.lock(task_id).await;
        let mut task = self.fetch_task(task_id).await?;

        let existing = task
            .artifacts
            .iter_mut()
            .find(|stored| stored.artifact_id == artifact.artifact_id);
        match existing {
            Some(stored) if append => stored.parts.extend(artifact.parts.iter().cloned()),
            _ => task.artifacts.push(artifact.clone()),
        }
        self.inner.store.set_task(&task).await?;

        self.emit(
            TaskArtifactUpdateEvent::new(task_id, &task.context_id, artifact)
                .chunk(append, last_chunk)
                .into(),
        );
        Ok(())
    }

    /// Store the push notification config of a task.
    pub async fn set_push_notification_config(
        &self,
        config: TaskPushNotificationConfig,
    ) -> AgentResult<TaskPushNotificationConfig> {
        self.ensure_push_notifications()?;

        if config.task_id.trim().is_empty() {
            return Err(AgentError::invalid_params("taskId", "must not be empty"));
        }
        let url = config.push_notification_config.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AgentError::invalid_params(
                "pushNotificationConfig.url",
                "must be an http(s) URL",
            ));
        }

        self.inner.store.set_push_notification_config(&config).await?;
        tracing::debug!(task_id = %config.task_id, "Push notification config stored");
        Ok(config)
    }

    pub async fn get_push_notification_config(
        &self,
        task_id: &str,
    ) -> AgentResult<TaskPushNotificationConfig> {
        self.ensure_push_notifications()?;

        self.inner
            .store
            .get_push_notification_config(task_id)
            .await?
            .ok_or_else(|| AgentError::PushNotificationConfigNotFound {
                task_id: task_id.to_string(),
            })
    }

    pub async fn delete_push_notification_config(&self, task_id: &str) -> AgentResult<()> {
        self.ensure_push_notifications()?;

        if self
            .inner
            .store
            .delete_push_notification_config(task_id)
            .await?
        {
            Ok(())
        } else {
            Err(AgentError::PushNotificationConfigNotFound {
                task_id: task_id.to_string(),
            })
        }
    }

    /// The agent card advertised at `agent_url`.
    pub fn agent_card(&self, agent_url: &str) -> AgentCard {
        self.inner.agent.on_agent_card_query(agent_url)
    }

    async fn fetch_task(&self, task_id: &str) -> AgentResult<Task> {
        self.inner
            .store
            .get_task(task_id)
            .await?
            .ok_or_else(|| AgentError::task_not_found(task_id))
    }

    /// Append `message` to the task it names, or create a task for it.
    async fn resolve_task(&self, mut message: Message) -> AgentResult<(Task, TaskHook)> {
        match message.task_id.clone() {
            Some(task_id) => {
                let _guard = self.inner.locks.lock(&task_id).await;
                let mut task = self.fetch_task(&task_id).await?;

                message.context_id.get_or_insert_with(|| task.context_id.clone());
                task.history.push(message);
                self.inner.store.set_task(&task).await?;
                tracing::debug!(task_id, history = task.history.len(), "Message appended");
                Ok((task, TaskHook::Updated))
            }
            None => {
                let mut task = self.create_task(message.context_id.clone()).await?;
                let _guard = self.inner.locks.lock(&task.id).await;

                message.task_id = Some(task.id.clone());
                message.context_id = Some(task.context_id.clone());
                task.history.push(message);
                self.inner.store.set_task(&task).await?;
                Ok((task, TaskHook::Created))
            }
        }
    }

    fn spawn_hook(&self, hook: TaskHook, task: Task, queue: Arc<TaskEventQueue>) {
        let manager = self.clone();
        let task_id = task.id.clone();
        let span = tracing::info_span!("agent_hook", task_id = %task_id, hook = hook.name());

        tokio::spawn(
            async move {
                // Run the hook in its own task so a panic surfaces as a JoinError here.
                let run = {
                    let manager = manager.clone();
                    tokio::spawn(async move {
                        let agent = Arc::clone(&manager.inner.agent);
                        match hook {
                            TaskHook::Created => agent.on_task_created(&manager, task).await,
                            TaskHook::Updated => agent.on_task_updated(&manager, task).await,
                        }
                    })
                };

                let reason = match run.await {
                    Ok(Ok(())) => {
                        manager.finish_stream(&task_id, &queue).await;
                        return;
                    }
                    Ok(Err(err)) => err.to_string(),
                    Err(join_err) => AgentError::from(join_err).to_string(),
                };
                manager.fail_task(&task_id, hook, reason, &queue).await;
            }
            .instrument(span),
        );
    }

    /// End the stream of a hook that returned without a final event by
    /// replaying the persisted status as the final one.
    async fn finish_stream(&self, task_id: &str, queue: &Arc<TaskEventQueue>) {
        // Finalized by the agent, or replaced by a newer stream that owns the task now.
        if queue.is_closed() {
            return;
        }

        let _guard = self.inner.locks.lock(task_id).await;
        match self.fetch_task(task_id).await {
            Ok(task) => {
                tracing::debug!(
                    task_id,
                    state = %task.status.state,
                    "Agent hook returned without a final event, closing stream"
                );
                let event =
                    TaskStatusUpdateEvent::new(&task.id, &task.context_id, task.status, true);
                if queue.notify_final_event(event.into()).is_ok() {
                    self.inner.queues.schedule_eviction(Arc::clone(queue));
                }
            }
            Err(err) => {
                tracing::warn!(task_id, error = %err, "Could not close event stream");
                queue.shut();
                self.inner.queues.remove_queue(queue);
            }
        }
    }

    async fn fail_task(&self, task_id: &str, hook: TaskHook, reason: String, queue: &TaskEventQueue) {
        // A queue shut because a newer stream replaced it has not ended the task.
        if queue.is_finalized() {
            tracing::error!(task_id, hook = hook.name(), %reason, "Agent hook failed after the stream ended");
            return;
        }

        tracing::error!(task_id, hook = hook.name(), %reason, "Agent hook failed, marking task as failed");
        let message = Message::agent_text(format!("{} failed: {reason}", hook.name()))
            .with_task_id(task_id);
        if let Err(err) = self
            .update_status(task_id, TaskState::Failed, Some(message), true)
            .await
        {
            tracing::error!(task_id, error = %err, "Could not record task failure");
            queue.shut();
        }
    }

    /// Push `event` to the task's live queue, if any.
    fn emit(&self, event: TaskEvent) {
        let Some(queue) = self.inner.queues.get(event.task_id()) else {
            return;
        };

        let is_final = event.is_final();
        let pushed = if is_final {
            queue.notify_final_event(event)
        } else {
            queue.notify_event(event)
        };

        if is_final && pushed.is_ok() {
            self.inner.queues.schedule_eviction(queue);
        }
    }

    fn ensure_push_notifications(&self) -> AgentResult<()> {
        if self.inner.config.push_notifications_enabled {
            Ok(())
        } else {
            Err(AgentError::PushNotificationNotSupported)
        }
    }
}

impl std::fmt::Debug for TaskManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskManager")
            .field("config", &self.inner.config)
            .field("live_streams", &self.inner.queues.len())
            .finish()
    }
}
