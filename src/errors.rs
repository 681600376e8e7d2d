use a2a_types::TaskState;

/// Main error type of the task runtime
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    // === Task Errors ===
    #[error("Task not found: {task_id}")]
    TaskNotFound { task_id: String },

    #[error("Task cannot be canceled: {task_id} is {state}")]
    TaskNotCancelable { task_id: String, state: TaskState },

    #[error("Invalid task state transition for {task_id}: {from} -> {to}")]
    InvalidTaskStateTransition {
        task_id: String,
        from: TaskState,
        to: TaskState,
    },

    #[error("Push notification config not found for task: {task_id}")]
    PushNotificationConfigNotFound { task_id: String },

    #[error("Push notifications are not supported")]
    PushNotificationNotSupported,

    // === Streaming Errors ===
    #[error("No event stream registered for task: {task_id}")]
    StreamNotFound { task_id: String },

    #[error("Event stream already closed for task: {task_id}")]
    StreamClosed { task_id: String },

    // === Request Errors ===
    #[error("Invalid params: {field}: {reason}")]
    InvalidParams { field: String, reason: String },

    #[error("Unsupported operation: {operation}")]
    UnsupportedOperation { operation: String },

    // === Agent Errors ===
    #[error("Agent callback failed: {callback}: {reason}")]
    AgentFailed { callback: String, reason: String },

    // === Configuration Errors ===
    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfiguration { field: String, reason: String },

    // === General System Errors ===
    #[error("Serialization error: {format}: {reason}")]
    Serialization { format: String, reason: String },

    #[error("Internal error: {component}: {reason}")]
    Internal { component: String, reason: String },
}

impl AgentError {
    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::TaskNotFound { .. }
            | Self::TaskNotCancelable { .. }
            | Self::InvalidTaskStateTransition { .. }
            | Self::PushNotificationConfigNotFound { .. }
            | Self::PushNotificationNotSupported => "task",

            Self::StreamNotFound { .. } | Self::StreamClosed { .. } => "stream",

            Self::InvalidParams { .. } | Self::UnsupportedOperation { .. } => "request",

            Self::AgentFailed { .. } => "agent",

            Self::InvalidConfiguration { .. } => "config",

            Self::Serialization { .. } => "io",

            Self::Internal { .. } => "system",
        }
    }

    /// Check if this error should be logged as an error vs warning
    pub fn is_error_level(&self) -> bool {
        match self {
            // Unexpected, something on the server side broke
            Self::Internal { .. } => true,
            Self::AgentFailed { .. } => true,
            Self::Serialization { .. } => true,

            // Caller mistakes and expected misses
            _ => false,
        }
    }

    /// Shorthand for the most common failure of task operations.
    pub fn task_not_found(task_id: impl Into<String>) -> Self {
        Self::TaskNotFound {
            task_id: task_id.into(),
        }
    }

    pub fn invalid_params(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParams {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias
pub type AgentResult<T> = std::result::Result<T, AgentError>;

impl From<serde_json::Error> for AgentError {
    fn from(error: serde_json::Error) -> Self {
        AgentError::Serialization {
            format: "json".to_string(),
            reason: error.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for AgentError {
    fn from(error: serde_yaml::Error) -> Self {
        AgentError::Serialization {
            format: "yaml".to_string(),
            reason: error.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for AgentError {
    fn from(error: tokio::task::JoinError) -> Self {
        let reason = if error.is_panic() {
            "task panicked".to_string()
        } else {
            "task was cancelled".to_string()
        };
        AgentError::Internal {
            component: "background_task".to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let task_err = AgentError::task_not_found("test");
        assert_eq!(task_err.category(), "task");
        assert!(!task_err.is_error_level());
        assert_eq!(task_err.to_string(), "Task not found: test");

        let stream_err = AgentError::StreamNotFound {
            task_id: "t".to_string(),
        };
        assert_eq!(stream_err.category(), "stream");

        let internal = AgentError::Internal {
            component: "store".to_string(),
            reason: "poisoned".to_string(),
        };
        assert_eq!(internal.category(), "system");
        assert!(internal.is_error_level());
    }

    #[test]
    fn test_transition_error_message() {
        let err = AgentError::InvalidTaskStateTransition {
            task_id: "t1".to_string(),
            from: TaskState::Completed,
            to: TaskState::Working,
        };
        assert_eq!(
            err.to_string(),
            "Invalid task state transition for t1: completed -> working"
        );
    }

    #[test]
    fn test_error_conversions() {
        let json_err: AgentError = serde_json::from_str::<serde_json::Value>("invalid json")
            .unwrap_err()
            .into();
        assert_eq!(json_err.category(), "io");

        let yaml_err: AgentError = serde_yaml::from_str::<Vec<u32>>("{not: [a list")
            .unwrap_err()
            .into();
        assert!(matches!(yaml_err, AgentError::Serialization { format, .. } if format == "yaml"));
    }

    #[tokio::test]
    async fn test_join_error_conversion() {
        let handle = tokio::spawn(async { panic!("boom") });
        let join_err = handle.await.unwrap_err();
        let err: AgentError = join_err.into();
        assert!(matches!(err, AgentError::Internal { reason, .. } if reason == "task panicked"));
    }
}
