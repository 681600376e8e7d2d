//! # A2A (Agent2Agent) Protocol Types
//!
//! Rust data structures for the wire format of the Agent2Agent (A2A) task
//! protocol: the JSON-RPC 2.0 envelope, tasks and their lifecycle states,
//! messages and their parts, artifacts, streaming update events and the
//! agent card used for discovery.
//!
//! All types serialize with `serde` using the camelCase field names of the
//! protocol. Polymorphic payloads (`Part`, streaming results) are closed
//! enums so the transport can match on them exhaustively.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod agent_card;
pub mod events;
pub mod jsonrpc;
pub mod message;
pub mod params;
pub mod task;

pub use agent_card::{
    AgentCapabilities, AgentCard, AgentInterface, AgentProvider, AgentSkill, TransportProtocol,
};
pub use events::{TaskArtifactUpdateEvent, TaskStatusUpdateEvent};
pub use jsonrpc::{
    error_codes, methods, JSONRPCError, JSONRPCErrorResponse, JSONRPCId, JSONRPCRequest,
    JSONRPCResponse, JSONRPCSuccessResponse,
};
pub use message::{Artifact, FileContent, FileWithBytes, FileWithUri, Message, MessageRole, Part};
pub use params::{
    MessageSendConfiguration, MessageSendParams, PushNotificationAuthenticationInfo,
    PushNotificationConfig, TaskIdParams, TaskPushNotificationConfig, TaskQueryParams,
};
pub use task::{Task, TaskState, TaskStatus};

/// Opaque extension metadata attached to most protocol objects.
pub type Metadata = HashMap<String, serde_json::Value>;

pub const PROTOCOL_VERSION: &str = "0.3.0";
pub const JSONRPC_VERSION: &str = "2.0";
pub const TASK_KIND: &str = "task";
pub const MESSAGE_KIND: &str = "message";
pub const STATUS_UPDATE_KIND: &str = "status-update";
pub const ARTIFACT_UPDATE_KIND: &str = "artifact-update";

/// Result of `message/send`: either the task tracking the turn or, for
/// stateless agents, a direct reply message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SendMessageResult {
    Task(Task),
    Message(Message),
}

impl SendMessageResult {
    pub fn as_task(&self) -> Option<&Task> {
        match self {
            SendMessageResult::Task(task) => Some(task),
            SendMessageResult::Message(_) => None,
        }
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            SendMessageResult::Message(message) => Some(message),
            SendMessageResult::Task(_) => None,
        }
    }
}

/// A single item of a `message/stream` or `tasks/resubscribe` SSE stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SendStreamingMessageResult {
    Task(Task),
    Message(Message),
    TaskStatusUpdate(TaskStatusUpdateEvent),
    TaskArtifactUpdate(TaskArtifactUpdateEvent),
}

impl SendStreamingMessageResult {
    /// True when this item closes the stream.
    pub fn is_final(&self) -> bool {
        match self {
            SendStreamingMessageResult::TaskStatusUpdate(event) => event.is_final,
            _ => false,
        }
    }
}

impl From<TaskStatusUpdateEvent> for SendStreamingMessageResult {
    fn from(event: TaskStatusUpdateEvent) -> Self {
        SendStreamingMessageResult::TaskStatusUpdate(event)
    }
}

impl From<TaskArtifactUpdateEvent> for SendStreamingMessageResult {
    fn from(event: TaskArtifactUpdateEvent) -> Self {
        SendStreamingMessageResult::TaskArtifactUpdate(event)
    }
}
