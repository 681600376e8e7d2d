use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Artifact, Message, Metadata, TASK_KIND};

/// Lifecycle states of a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    /// Accepted, not started yet.
    Submitted,
    Working,
    /// Paused until the client sends another message.
    InputRequired,
    Completed,
    Canceled,
    Failed,
    /// The agent declined the task.
    Rejected,
    AuthRequired,
    Unknown,
}

impl TaskState {
    /// Terminal states end the task; no further work is expected.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Canceled | TaskState::Failed | TaskState::Rejected
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Submitted => "submitted",
            TaskState::Working => "working",
            TaskState::InputRequired => "input-required",
            TaskState::Completed => "completed",
            TaskState::Canceled => "canceled",
            TaskState::Failed => "failed",
            TaskState::Rejected => "rejected",
            TaskState::AuthRequired => "auth-required",
            TaskState::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The status of a task at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskStatus {
    pub state: TaskState,
    /// Optional human-readable message from the agent about this status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    /// When the status was recorded (RFC 3339 on the wire).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl TaskStatus {
    pub fn new(state: TaskState) -> Self {
        Self {
            state,
            message: None,
            timestamp: Some(Utc::now()),
        }
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.message = Some(message);
        self
    }
}

/// One unit of agent work: its status, the conversation that drove it and
/// the artifacts it produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Always "task".
    #[serde(default = "default_task_kind")]
    pub kind: String,
    /// Immutable once the task is created.
    pub id: String,
    /// Groups related tasks and messages.
    pub context_id: String,
    pub status: TaskStatus,
    /// Messages exchanged for this task, oldest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<Message>,
    /// Outputs produced by the agent, in the order they were returned.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<Artifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

fn default_task_kind() -> String {
    TASK_KIND.to_string()
}

impl Task {
    /// A freshly submitted task with empty history and artifacts.
    pub fn new(id: impl Into<String>, context_id: impl Into<String>) -> Self {
        Self {
            kind: default_task_kind(),
            id: id.into(),
            context_id: context_id.into(),
            status: TaskStatus::new(TaskState::Submitted),
            history: Vec::new(),
            artifacts: Vec::new(),
            metadata: None,
        }
    }

    /// Keeps only the `length` most recent history entries.
    pub fn truncate_history(&mut self, length: usize) {
        if self.history.len() > length {
            let excess = self.history.len() - length;
            self.history.drain(..excess);
        }
    }
}
