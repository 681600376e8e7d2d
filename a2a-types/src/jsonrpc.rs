//! JSON-RPC 2.0 envelope types and the A2A error-code table.

use serde::{Deserialize, Serialize};

use crate::JSONRPC_VERSION;

/// Method names understood by an A2A JSON-RPC endpoint.
pub mod methods {
    pub const MESSAGE_SEND: &str = "message/send";
    pub const MESSAGE_STREAM: &str = "message/stream";
    pub const TASKS_GET: &str = "tasks/get";
    pub const TASKS_CANCEL: &str = "tasks/cancel";
    pub const TASKS_RESUBSCRIBE: &str = "tasks/resubscribe";
    pub const PUSH_CONFIG_SET: &str = "tasks/pushNotificationConfig/set";
    pub const PUSH_CONFIG_GET: &str = "tasks/pushNotificationConfig/get";
}

/// Standard JSON-RPC codes plus the A2A domain codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    pub const TASK_NOT_FOUND: i32 = -32001;
    pub const TASK_NOT_CANCELABLE: i32 = -32002;
    pub const PUSH_NOTIFICATION_NOT_SUPPORTED: i32 = -32003;
    pub const UNSUPPORTED_OPERATION: i32 = -32004;
    pub const CONTENT_TYPE_NOT_SUPPORTED: i32 = -32005;
}

/// A JSON-RPC request identifier: string, number, or null.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum JSONRPCId {
    String(String),
    Integer(i64),
    Null,
}

impl From<&str> for JSONRPCId {
    fn from(value: &str) -> Self {
        JSONRPCId::String(value.to_string())
    }
}

impl From<i64> for JSONRPCId {
    fn from(value: i64) -> Self {
        JSONRPCId::Integer(value)
    }
}

/// A JSON-RPC request whose params are decoded later, once the method is known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JSONRPCRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<JSONRPCId>,
}

impl JSONRPCRequest {
    pub fn new(id: impl Into<JSONRPCId>, method: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params: Some(params),
            id: Some(id.into()),
        }
    }
}

/// A successful response carrying a typed result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JSONRPCSuccessResponse<T> {
    pub jsonrpc: String,
    pub id: Option<JSONRPCId>,
    pub result: T,
}

impl<T> JSONRPCSuccessResponse<T> {
    pub fn new(id: Option<JSONRPCId>, result: T) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result,
        }
    }
}

/// An error response. The id is null when the request could not be read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JSONRPCErrorResponse {
    pub jsonrpc: String,
    pub id: Option<JSONRPCId>,
    pub error: JSONRPCError,
}

impl JSONRPCErrorResponse {
    pub fn new(id: Option<JSONRPCId>, error: JSONRPCError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error,
        }
    }
}

/// Either side of a JSON-RPC exchange, decoded by shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum JSONRPCResponse<T> {
    Success(JSONRPCSuccessResponse<T>),
    Error(JSONRPCErrorResponse),
}

impl<T> JSONRPCResponse<T> {
    pub fn into_result(self) -> Result<T, JSONRPCError> {
        match self {
            JSONRPCResponse::Success(success) => Ok(success.result),
            JSONRPCResponse::Error(failure) => Err(failure.error),
        }
    }
}

/// The error object of a JSON-RPC error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JSONRPCError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JSONRPCError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn parse_error() -> Self {
        Self::new(error_codes::PARSE_ERROR, "Invalid JSON payload")
    }

    pub fn invalid_request(detail: impl Into<String>) -> Self {
        Self::new(error_codes::INVALID_REQUEST, "Request payload validation error")
            .with_data(serde_json::Value::String(detail.into()))
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {method}"),
        )
    }

    pub fn invalid_params(detail: impl Into<String>) -> Self {
        Self::new(error_codes::INVALID_PARAMS, "Invalid parameters")
            .with_data(serde_json::Value::String(detail.into()))
    }

    pub fn internal_error() -> Self {
        Self::new(error_codes::INTERNAL_ERROR, "Internal error")
    }

    pub fn task_not_found(task_id: &str) -> Self {
        Self::new(error_codes::TASK_NOT_FOUND, format!("Task not found: {task_id}"))
    }

    pub fn task_not_cancelable(task_id: &str) -> Self {
        Self::new(
            error_codes::TASK_NOT_CANCELABLE,
            format!("Task cannot be canceled: {task_id}"),
        )
    }

    pub fn push_notification_not_supported() -> Self {
        Self::new(
            error_codes::PUSH_NOTIFICATION_NOT_SUPPORTED,
            "Push Notification is not supported",
        )
    }

    pub fn unsupported_operation(detail: impl Into<String>) -> Self {
        Self::new(
            error_codes::UNSUPPORTED_OPERATION,
            "This operation is not supported",
        )
        .with_data(serde_json::Value::String(detail.into()))
    }

    pub fn content_type_not_supported(detail: impl Into<String>) -> Self {
        Self::new(
            error_codes::CONTENT_TYPE_NOT_SUPPORTED,
            "Incompatible content types",
        )
        .with_data(serde_json::Value::String(detail.into()))
    }
}

impl std::fmt::Display for JSONRPCError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

impl std::error::Error for JSONRPCError {}
