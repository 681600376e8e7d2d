//! Translation of runtime errors into JSON-RPC errors and HTTP statuses.
//!
//! Internal failures are logged here with their details and reported to the
//! caller with a generic message.

use a2a_runtime::AgentError;
use a2a_types::JSONRPCError;
use axum::http::StatusCode;

/// The JSON-RPC error object for `error`.
pub fn to_jsonrpc_error(error: &AgentError) -> JSONRPCError {
    log_error(error);

    match error {
        AgentError::TaskNotFound { task_id }
        | AgentError::StreamNotFound { task_id } => JSONRPCError::task_not_found(task_id),
        AgentError::PushNotificationConfigNotFound { task_id } => {
            JSONRPCError::task_not_found(task_id)
                .with_data(serde_json::Value::String(error.to_string()))
        }
        AgentError::TaskNotCancelable { task_id, .. } => JSONRPCError::task_not_cancelable(task_id)
            .with_data(serde_json::Value::String(error.to_string())),
        AgentError::InvalidTaskStateTransition { .. } | AgentError::InvalidParams { .. } => {
            JSONRPCError::invalid_params(error.to_string())
        }
        AgentError::PushNotificationNotSupported => JSONRPCError::push_notification_not_supported(),
        AgentError::UnsupportedOperation { operation } => {
            JSONRPCError::unsupported_operation(operation.clone())
        }
        AgentError::StreamClosed { .. }
        | AgentError::AgentFailed { .. }
        | AgentError::InvalidConfiguration { .. }
        | AgentError::Serialization { .. }
        | AgentError::Internal { .. } => JSONRPCError::internal_error(),
    }
}

/// The HTTP status of the REST surface for `error`.
pub fn http_status(error: &AgentError) -> StatusCode {
    match error {
        AgentError::TaskNotFound { .. }
        | AgentError::StreamNotFound { .. }
        | AgentError::PushNotificationConfigNotFound { .. } => StatusCode::NOT_FOUND,
        AgentError::InvalidParams { .. } => StatusCode::BAD_REQUEST,
        AgentError::TaskNotCancelable { .. } | AgentError::InvalidTaskStateTransition { .. } => {
            StatusCode::CONFLICT
        }
        AgentError::PushNotificationNotSupported | AgentError::UnsupportedOperation { .. } => {
            StatusCode::NOT_IMPLEMENTED
        }
        AgentError::StreamClosed { .. }
        | AgentError::AgentFailed { .. }
        | AgentError::InvalidConfiguration { .. }
        | AgentError::Serialization { .. }
        | AgentError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The message shown to REST callers for `error`.
pub fn public_message(error: &AgentError) -> String {
    if http_status(error).is_server_error() {
        "Internal error".to_string()
    } else {
        error.to_string()
    }
}

fn log_error(error: &AgentError) {
    if error.is_error_level() {
        tracing::error!(category = error.category(), error = %error, "Request failed");
    } else {
        tracing::debug!(category = error.category(), error = %error, "Request rejected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a2a_types::error_codes;
    use a2a_types::TaskState;

    #[test]
    fn test_codes() {
        let cases = [
            (AgentError::task_not_found("t"), error_codes::TASK_NOT_FOUND),
            (
                AgentError::StreamNotFound { task_id: "t".into() },
                error_codes::TASK_NOT_FOUND,
            ),
            (
                AgentError::TaskNotCancelable {
                    task_id: "t".into(),
                    state: TaskState::Completed,
                },
                error_codes::TASK_NOT_CANCELABLE,
            ),
            (
                AgentError::PushNotificationNotSupported,
                error_codes::PUSH_NOTIFICATION_NOT_SUPPORTED,
            ),
            (
                AgentError::UnsupportedOperation { operation: "x".into() },
                error_codes::UNSUPPORTED_OPERATION,
            ),
            (AgentError::invalid_params("id", "empty"), error_codes::INVALID_PARAMS),
        ];

        for (error, code) in cases {
            assert_eq!(to_jsonrpc_error(&error).code, code, "{error}");
        }
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let error = AgentError::Internal {
            component: "store".into(),
            reason: "connection string postgres://admin:secret@db".into(),
        };

        let rpc = to_jsonrpc_error(&error);
        assert_eq!(rpc.code, error_codes::INTERNAL_ERROR);
        assert!(!rpc.message.contains("secret"));
        assert!(rpc.data.is_none());

        assert_eq!(http_status(&error), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(public_message(&error), "Internal error");
    }

    #[test]
    fn test_http_statuses() {
        assert_eq!(http_status(&AgentError::task_not_found("t")), StatusCode::NOT_FOUND);
        assert_eq!(
            http_status(&AgentError::invalid_params("id", "empty")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            http_status(&AgentError::PushNotificationNotSupported),
            StatusCode::NOT_IMPLEMENTED
        );
    }
}
