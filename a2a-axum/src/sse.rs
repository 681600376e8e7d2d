//! Server-Sent Events framing of task event streams.
//!
//! Every event becomes one `data: <json>\n\n` frame. JSON-RPC streams wrap
//! each event in a success response carrying the request id; REST streams send
//! the bare event.

use std::time::Duration;

use a2a_runtime::TaskEventStream;
use a2a_types::{JSONRPCId, JSONRPCSuccessResponse, SendStreamingMessageResult};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::{Stream, StreamExt};
use serde::Serialize;

/// SSE response for a JSON-RPC streaming call.
pub fn rpc_event_stream(
    events: TaskEventStream,
    id: Option<JSONRPCId>,
    keep_alive: Duration,
) -> Response {
    let frames = events.map(move |event| {
        JSONRPCSuccessResponse::new(id.clone(), SendStreamingMessageResult::from(event))
    });
    event_stream(frames, keep_alive).into_response()
}

/// SSE response for a REST streaming route.
pub fn rest_event_stream(events: TaskEventStream, keep_alive: Duration) -> Response {
    event_stream(events.map(SendStreamingMessageResult::from), keep_alive).into_response()
}

fn event_stream<S, T>(
    items: S,
    keep_alive: Duration,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>>
where
    S: Stream<Item = T> + Send + 'static,
    T: Serialize,
{
    let frames = items.map(|item| Event::default().json_data(item));
    Sse::new(frames).keep_alive(KeepAlive::new().interval(keep_alive))
}
