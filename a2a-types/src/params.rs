//! Parameter objects of the A2A JSON-RPC methods.

use serde::{Deserialize, Serialize};

use crate::{Message, Metadata};

/// Params of `message/send` and `message/stream`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageSendParams {
    pub message: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<MessageSendConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl MessageSendParams {
    pub fn new(message: Message) -> Self {
        Self {
            message,
            configuration: None,
            metadata: None,
        }
    }

    /// History length requested by the caller, if any.
    pub fn history_length(&self) -> Option<usize> {
        self.configuration
            .as_ref()
            .and_then(|config| config.history_length)
            .map(|len| len as usize)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageSendConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocking: Option<bool>,
    /// Number of most recent history messages to include in the returned task.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accepted_output_modes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_notification_config: Option<PushNotificationConfig>,
}

/// Where and how the agent should deliver out-of-band task updates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PushNotificationConfig {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Token the receiver uses to validate incoming notifications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<PushNotificationAuthenticationInfo>,
}

impl PushNotificationConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            id: None,
            token: None,
            authentication: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PushNotificationAuthenticationInfo {
    /// e.g. "Bearer", "Basic".
    pub schemes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<String>,
}

/// Params of `tasks/cancel`, `tasks/resubscribe` and
/// `tasks/pushNotificationConfig/get`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskIdParams {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl TaskIdParams {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            metadata: None,
        }
    }
}

/// Params of `tasks/get`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskQueryParams {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl TaskQueryParams {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            history_length: None,
            metadata: None,
        }
    }
}

impl From<TaskIdParams> for TaskQueryParams {
    fn from(params: TaskIdParams) -> Self {
        Self {
            id: params.id,
            history_length: None,
            metadata: params.metadata,
        }
    }
}

/// A push notification config bound to a task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskPushNotificationConfig {
    pub task_id: String,
    pub push_notification_config: PushNotificationConfig,
}

impl TaskPushNotificationConfig {
    pub fn new(task_id: impl Into<String>, config: PushNotificationConfig) -> Self {
        Self {
            task_id: task_id.into(),
            push_notification_config: config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_push_config_wire_shape() {
        let config: TaskPushNotificationConfig = serde_json::from_value(json!({
            "taskId": "task-1",
            "pushNotificationConfig": {
                "url": "https://hooks.example.com/a2a",
                "token": "secret",
                "authentication": {"schemes": ["Bearer"]}
            }
        }))
        .unwrap();

        assert_eq!(config.task_id, "task-1");
        assert_eq!(config.push_notification_config.token.as_deref(), Some("secret"));
        assert_eq!(
            config.push_notification_config.authentication.unwrap().schemes,
            vec!["Bearer".to_string()]
        );
    }

    #[test]
    fn test_history_length_from_configuration() {
        let params: MessageSendParams = serde_json::from_value(json!({
            "message": {"messageId": "m", "role": "user", "parts": []},
            "configuration": {"historyLength": 3, "acceptedOutputModes": ["text/plain"]}
        }))
        .unwrap();
        assert_eq!(params.history_length(), Some(3));

        let bare = MessageSendParams::new(Message::user_text("x"));
        assert_eq!(bare.history_length(), None);
    }
}
