use a2a_types::{AgentCard, Message, MessageSendParams, Task};
use async_trait::async_trait;

use crate::errors::{AgentError, AgentResult};
use crate::task::TaskManager;

/// Hooks the [`TaskManager`] invokes on behalf of an agent.
///
/// Every method has a no-op default, so an implementation only overrides the
/// hooks it cares about. Hooks receive the manager that invoked them and may
/// call back into it freely (`update_status`, `return_artifact`, `get_task`):
/// the manager never holds a task lock while a hook runs.
///
/// For `message/send` the hook is awaited and its error is returned to the
/// caller. For `message/stream` it runs in the background; an error or panic
/// then ends the stream with a final `failed` status.
#[async_trait]
pub trait AgentHandler: Send + Sync {
    /// Whether task-less messages are answered by
    /// [`on_message_received`](Self::on_message_received) instead of
    /// creating a task.
    fn handles_stateless_messages(&self) -> bool {
        false
    }

    /// Answer a message directly without creating a task.
    async fn on_message_received(
        &self,
        _manager: &TaskManager,
        _params: MessageSendParams,
    ) -> AgentResult<Message> {
        Err(AgentError::UnsupportedOperation {
            operation: "stateless messages".to_string(),
        })
    }

    /// A task was created from an incoming message. `task.history` holds that message.
    async fn on_task_created(&self, _manager: &TaskManager, _task: Task) -> AgentResult<()> {
        Ok(())
    }

    /// A message was appended to an existing task.
    async fn on_task_updated(&self, _manager: &TaskManager, _task: Task) -> AgentResult<()> {
        Ok(())
    }

    /// The task was canceled. In-flight work for it is not interrupted.
    async fn on_task_cancelled(&self, _manager: &TaskManager, _task: Task) -> AgentResult<()> {
        Ok(())
    }

    /// Describe the agent for discovery.
    fn on_agent_card_query(&self, agent_url: &str) -> AgentCard {
        AgentCard::new(
            "a2a-agent",
            "Agent served by the A2A task runtime",
            env!("CARGO_PKG_VERSION"),
            agent_url,
        )
    }
}

/// Handler that accepts every task and does nothing with it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAgent;

impl AgentHandler for NoopAgent {}
