use std::time::Duration;

use a2a_runtime::TaskManager;
use a2a_types::{
    AgentCard, MessageSendParams, PushNotificationConfig, SendMessageResult, Task,
    TaskPushNotificationConfig, TaskQueryParams,
};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::{get, post, put},
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize};
use tokio_util::sync::CancellationToken;

use crate::{
    error::Result,
    json_rpc, sse,
};

/// State shared across all routes
#[derive(Clone)]
pub struct ServerState {
    pub manager: TaskManager,
    /// URL advertised in the agent card.
    pub agent_url: String,
    pub keep_alive: Duration,
    /// Cancelled on shutdown; every open stream observes a child of it.
    pub shutdown: CancellationToken,
}

impl ServerState {
    pub fn stream_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}

/// Create the JSON-RPC endpoint and the REST routes under `base_path`
/// (no trailing slash, "" for the root).
pub fn create_routes(state: ServerState, base_path: &str) -> Router {
    let rpc_path = if base_path.is_empty() { "/" } else { base_path };

    Router::new()
        // JSON-RPC endpoint
        .route(rpc_path, post(json_rpc::handle_rpc))
        // Agent card discovery
        .route(&format!("{base_path}/.well-known/agent.json"), get(agent_card))
        .route(&format!("{base_path}/.well-known/agent-card.json"), get(agent_card))
        // REST companion surface
        .route(&format!("{base_path}/tasks/{{id}}"), get(get_task))
        .route(&format!("{base_path}/tasks/{{id}}/cancel"), post(cancel_task))
        .route(&format!("{base_path}/tasks/{{id}}/send"), post(send_message))
        .route(&format!("{base_path}/tasks/{{id}}/sendSubscribe"), post(send_subscribe))
        .route(&format!("{base_path}/tasks/{{id}}/resubscribe"), post(resubscribe))
        .route(
            &format!("{base_path}/tasks/{{id}}/pushNotification"),
            put(set_push_notification)
                .get(get_push_notification)
                .delete(delete_push_notification),
        )
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskQuery {
    history_length: Option<u32>,
}

/// Body of `PUT /tasks/{id}/pushNotification`. Any `taskId` in the body is
/// ignored in favor of the path.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PushNotificationBody {
    push_notification_config: PushNotificationConfig,
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T> {
    Ok(serde_json::from_slice(body)?)
}

/// Handler for the agent card
async fn agent_card(State(state): State<ServerState>) -> Json<AgentCard> {
    Json(state.manager.agent_card(&state.agent_url))
}

/// Handler for `GET /tasks/{id}`
async fn get_task(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(query): Query<TaskQuery>,
) -> Result<Json<Task>> {
    let mut params = TaskQueryParams::new(id);
    params.history_length = query.history_length;
    Ok(Json(state.manager.get_task(params).await?))
}

/// Handler for `POST /tasks/{id}/cancel`
async fn cancel_task(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Task>> {
    Ok(Json(state.manager.cancel_task(&id).await?))
}

/// Handler for `POST /tasks/{id}/send`
async fn send_message(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<SendMessageResult>> {
    let mut params: MessageSendParams = parse_body(&body)?;
    params.message.task_id = Some(id);
    Ok(Json(state.manager.send_message(params).await?))
}

/// Handler for `POST /tasks/{id}/sendSubscribe` (SSE)
async fn send_subscribe(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response> {
    let mut params: MessageSendParams = parse_body(&body)?;
    params.message.task_id = Some(id);
    let events = state
        .manager
        .send_subscribe(params, state.stream_token())
        .await?;
    Ok(sse::rest_event_stream(events, state.keep_alive))
}

/// Handler for `POST /tasks/{id}/resubscribe` (SSE)
async fn resubscribe(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Response> {
    let events = state.manager.resubscribe(&id, state.stream_token())?;
    Ok(sse::rest_event_stream(events, state.keep_alive))
}

/// Handler for `PUT /tasks/{id}/pushNotification`
async fn set_push_notification(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<TaskPushNotificationConfig>> {
    let body: PushNotificationBody = parse_body(&body)?;
    let config = TaskPushNotificationConfig::new(id, body.push_notification_config);
    Ok(Json(state.manager.set_push_notification_config(config).await?))
}

/// Handler for `GET /tasks/{id}/pushNotification`
async fn get_push_notification(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<TaskPushNotificationConfig>> {
    Ok(Json(state.manager.get_push_notification_config(&id).await?))
}

/// Handler for `DELETE /tasks/{id}/pushNotification`
async fn delete_push_notification(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.manager.delete_push_notification_config(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
