//! JSON-RPC 2.0 endpoint.
//!
//! The body is read as raw bytes so that malformed JSON (-32700) and
//! well-formed JSON that is not a request (-32600) can be told apart. Method
//! names match case-insensitively. Errors are always answered with HTTP 200
//! and a JSON-RPC error object.

use a2a_types::{
    methods, JSONRPCError, JSONRPCErrorResponse, JSONRPCId, JSONRPCRequest,
    JSONRPCSuccessResponse, MessageSendParams, TaskIdParams, TaskPushNotificationConfig,
    TaskQueryParams, JSONRPC_VERSION,
};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{error_mapper::to_jsonrpc_error, routes::ServerState, sse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcMethod {
    MessageSend,
    MessageStream,
    TasksGet,
    TasksCancel,
    TasksResubscribe,
    PushConfigSet,
    PushConfigGet,
}

impl RpcMethod {
    const ALL: [(&'static str, RpcMethod); 7] = [
        (methods::MESSAGE_SEND, RpcMethod::MessageSend),
        (methods::MESSAGE_STREAM, RpcMethod::MessageStream),
        (methods::TASKS_GET, RpcMethod::TasksGet),
        (methods::TASKS_CANCEL, RpcMethod::TasksCancel),
        (methods::TASKS_RESUBSCRIBE, RpcMethod::TasksResubscribe),
        (methods::PUSH_CONFIG_SET, RpcMethod::PushConfigSet),
        (methods::PUSH_CONFIG_GET, RpcMethod::PushConfigGet),
    ];

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .find(|(method, _)| method.eq_ignore_ascii_case(name))
            .map(|(_, parsed)| *parsed)
    }

    pub fn is_streaming(self) -> bool {
        matches!(self, RpcMethod::MessageStream | RpcMethod::TasksResubscribe)
    }
}

/// Media types compare case-insensitively and ignore parameters such as `charset`.
fn is_json_media_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|media_type| media_type.trim().eq_ignore_ascii_case("application/json"))
}

/// Handler for `POST {base_path}`.
pub async fn handle_rpc(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(content_type) = headers.get(header::CONTENT_TYPE) {
        let content_type = content_type.to_str().unwrap_or_default();
        if !is_json_media_type(content_type) {
            return rpc_error(
                None,
                JSONRPCError::content_type_not_supported(format!(
                    "expected application/json, got '{content_type}'"
                )),
            );
        }
    }

    let request = match parse_request(&body) {
        Ok(request) => request,
        Err((id, error)) => {
            tracing::debug!(code = error.code, "Rejected JSON-RPC payload");
            return rpc_error(id, error);
        }
    };

    let id = request.id.clone();
    let Some(method) = RpcMethod::parse(&request.method) else {
        tracing::debug!(method = %request.method, "Unknown JSON-RPC method");
        return rpc_error(id, JSONRPCError::method_not_found(&request.method));
    };

    tracing::debug!(method = %request.method, ?method, "Dispatching JSON-RPC request");
    match dispatch(&state, method, request.params, id.clone()).await {
        Ok(response) => response,
        Err(error) => rpc_error(id, error),
    }
}

fn parse_request(body: &[u8]) -> Result<JSONRPCRequest, (Option<JSONRPCId>, JSONRPCError)> {
    let value: Value =
        serde_json::from_slice(body).map_err(|_| (None, JSONRPCError::parse_error()))?;

    let id = value
        .get("id")
        .and_then(|id| serde_json::from_value::<JSONRPCId>(id.clone()).ok());

    let request: JSONRPCRequest = serde_json::from_value(value)
        .map_err(|e| (id.clone(), JSONRPCError::invalid_request(e.to_string())))?;

    if request.jsonrpc != JSONRPC_VERSION {
        return Err((id, JSONRPCError::invalid_request("jsonrpc must be \"2.0\"")));
    }
    Ok(request)
}

async fn dispatch(
    state: &ServerState,
    method: RpcMethod,
    params: Option<Value>,
    id: Option<JSONRPCId>,
) -> Result<Response, JSONRPCError> {
    let manager = &state.manager;

    let response = match method {
        RpcMethod::MessageSend => {
            let params: MessageSendParams = decode(params)?;
            let result = manager
                .send_message(params)
                .await
                .map_err(|e| to_jsonrpc_error(&e))?;
            success(id, result)
        }
        RpcMethod::MessageStream => {
            let params: MessageSendParams = decode(params)?;
            let events = manager
                .send_subscribe(params, state.stream_token())
                .await
                .map_err(|e| to_jsonrpc_error(&e))?;
            sse::rpc_event_stream(events, id, state.keep_alive)
        }
        RpcMethod::TasksGet => {
            let params: TaskQueryParams = decode(params)?;
            let task = manager
                .get_task(params)
                .await
                .map_err(|e| to_jsonrpc_error(&e))?;
            success(id, task)
        }
        RpcMethod::TasksCancel => {
            let params: TaskIdParams = decode(params)?;
            let task = manager
                .cancel_task(&params.id)
                .await
                .map_err(|e| to_jsonrpc_error(&e))?;
            success(id, task)
        }
        RpcMethod::TasksResubscribe => {
            let params: TaskIdParams = decode(params)?;
            let events = manager
                .resubscribe(&params.id, state.stream_token())
                .map_err(|e| to_jsonrpc_error(&e))?;
            sse::rpc_event_stream(events, id, state.keep_alive)
        }
        RpcMethod::PushConfigSet => {
            let params: TaskPushNotificationConfig = decode(params)?;
            let config = manager
                .set_push_notification_config(params)
                .await
                .map_err(|e| to_jsonrpc_error(&e))?;
            success(id, config)
        }
        RpcMethod::PushConfigGet => {
            let params: TaskIdParams = decode(params)?;
            let config = manager
                .get_push_notification_config(&params.id)
                .await
                .map_err(|e| to_jsonrpc_error(&e))?;
            success(id, config)
        }
    };
    Ok(response)
}

fn decode<T: DeserializeOwned>(params: Option<Value>) -> Result<T, JSONRPCError> {
    let params = params.ok_or_else(|| JSONRPCError::invalid_params("missing params"))?;
    serde_json::from_value(params).map_err(|e| JSONRPCError::invalid_params(e.to_string()))
}

fn success<T: Serialize>(id: Option<JSONRPCId>, result: T) -> Response {
    Json(JSONRPCSuccessResponse::new(id, result)).into_response()
}

fn rpc_error(id: Option<JSONRPCId>, error: JSONRPCError) -> Response {
    (StatusCode::OK, Json(JSONRPCErrorResponse::new(id, error))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names_match_case_insensitively() {
        assert_eq!(RpcMethod::parse("message/send"), Some(RpcMethod::MessageSend));
        assert_eq!(
            RpcMethod::parse("tasks/pushnotificationconfig/set"),
            Some(RpcMethod::PushConfigSet)
        );
        assert_eq!(
            RpcMethod::parse("tasks/pushNotificationConfig/get"),
            Some(RpcMethod::PushConfigGet)
        );
        assert_eq!(RpcMethod::parse("tasks/list"), None);
        assert!(RpcMethod::parse("TASKS/RESUBSCRIBE").unwrap().is_streaming());
    }

    #[test]
    fn test_json_media_type() {
        assert!(is_json_media_type("application/json"));
        assert!(is_json_media_type("Application/JSON"));
        assert!(is_json_media_type("application/json; charset=utf-8"));
        assert!(!is_json_media_type("application/jsonl"));
        assert!(!is_json_media_type("text/plain"));
    }

    #[test]
    fn test_parse_request_errors() {
        let (id, error) = parse_request(b"{not json").unwrap_err();
        assert!(id.is_none());
        assert_eq!(error.code, -32700);

        let (id, error) = parse_request(br#"{"jsonrpc":"2.0","id":4}"#).unwrap_err();
        assert_eq!(id, Some(JSONRPCId::Integer(4)));
        assert_eq!(error.code, -32600);

        let (_, error) =
            parse_request(br#"{"jsonrpc":"1.0","id":"a","method":"tasks/get"}"#).unwrap_err();
        assert_eq!(error.code, -32600);

        let (_, error) = parse_request(b"[1, 2]").unwrap_err();
        assert_eq!(error.code, -32600);
    }

    #[test]
    fn test_decode_missing_params() {
        let error = decode::<TaskIdParams>(None).unwrap_err();
        assert_eq!(error.code, -32602);

        let error = decode::<TaskIdParams>(Some(serde_json::json!({"nope": 1}))).unwrap_err();
        assert_eq!(error.code, -32602);
    }
}
