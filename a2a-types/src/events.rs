//! Streaming update events. They are not persisted; each one describes a
//! single status or artifact mutation of a task.

use serde::{Deserialize, Serialize};

use crate::{Artifact, Metadata, TaskStatus, ARTIFACT_UPDATE_KIND, STATUS_UPDATE_KIND};

/// A task changed status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusUpdateEvent {
    /// Always "status-update".
    #[serde(default = "default_status_update_kind")]
    pub kind: String,
    pub task_id: String,
    pub context_id: String,
    pub status: TaskStatus,
    /// Set on the last event of a stream.
    #[serde(rename = "final")]
    pub is_final: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

fn default_status_update_kind() -> String {
    STATUS_UPDATE_KIND.to_string()
}

impl TaskStatusUpdateEvent {
    pub fn new(
        task_id: impl Into<String>,
        context_id: impl Into<String>,
        status: TaskStatus,
        is_final: bool,
    ) -> Self {
        Self {
            kind: default_status_update_kind(),
            task_id: task_id.into(),
            context_id: context_id.into(),
            status,
            is_final,
            metadata: None,
        }
    }
}

/// An artifact was produced, or a chunk of one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskArtifactUpdateEvent {
    /// Always "artifact-update".
    #[serde(default = "default_artifact_update_kind")]
    pub kind: String,
    pub task_id: String,
    pub context_id: String,
    pub artifact: Artifact,
    /// The parts extend a previously sent artifact with the same id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub append: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_chunk: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

fn default_artifact_update_kind() -> String {
    ARTIFACT_UPDATE_KIND.to_string()
}

impl TaskArtifactUpdateEvent {
    pub fn new(task_id: impl Into<String>, context_id: impl Into<String>, artifact: Artifact) -> Self {
        Self {
            kind: default_artifact_update_kind(),
            task_id: task_id.into(),
            context_id: context_id.into(),
            artifact,
            append: None,
            last_chunk: Some(true),
            metadata: None,
        }
    }

    pub fn chunk(mut self, append: bool, last_chunk: bool) -> Self {
        self.append = Some(append);
        self.last_chunk = Some(last_chunk);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Part, TaskState};
    use serde_json::json;

    #[test]
    fn test_status_event_uses_final_key() {
        let event = TaskStatusUpdateEvent::new(
            "task-1",
            "ctx-1",
            TaskStatus::new(TaskState::Completed),
            true,
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["kind"], json!("status-update"));
        assert_eq!(value["final"], json!(true));
        assert_eq!(value["taskId"], json!("task-1"));
        assert!(value.get("isFinal").is_none());
    }

    #[test]
    fn test_artifact_chunk_flags() {
        let event = TaskArtifactUpdateEvent::new(
            "task-1",
            "ctx-1",
            Artifact::new("a-1", vec![Part::text("partial")]),
        )
        .chunk(true, false);
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["append"], json!(true));
        assert_eq!(value["lastChunk"], json!(false));
        assert_eq!(value["artifact"]["artifactId"], json!("a-1"));
    }
}
