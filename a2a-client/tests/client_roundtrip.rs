//! Client calls against a live A2A server on a loopback port.

use std::sync::Arc;
use std::time::Duration;

use a2a_axum::A2AServer;
use a2a_client::{A2AClient, A2AError, A2AEventStream};
use a2a_runtime::types::{
    AgentCard, Artifact, Message, MessageSendParams, Part, PushNotificationConfig,
    SendStreamingMessageResult, Task, TaskIdParams, TaskPushNotificationConfig, TaskQueryParams,
    TaskState,
};
use a2a_runtime::{AgentHandler, AgentResult, InMemoryTaskStore, TaskManager};
use async_trait::async_trait;
use futures::StreamExt;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Completes "hello" tasks with a reply, streams a report for "report", and
/// leaves anything else submitted.
struct ReportAgent;

#[async_trait]
impl AgentHandler for ReportAgent {
    async fn on_task_created(&self, manager: &TaskManager, task: Task) -> AgentResult<()> {
        let text = task.history.last().map(Message::text).unwrap_or_default();
        match text.as_str() {
            "hello" => {
                manager
                    .update_status(
                        &task.id,
                        TaskState::Completed,
                        Some(Message::agent_text("hi there")),
                        true,
                    )
                    .await?;
            }
            "report" => {
                manager
                    .update_status(&task.id, TaskState::Working, None, false)
                    .await?;
                manager
                    .return_artifact(
                        &task.id,
                        Artifact::new("report", vec![Part::text("all systems nominal")]),
                    )
                    .await?;
                manager
                    .update_status(&task.id, TaskState::Completed, None, true)
                    .await?;
            }
            _ => {}
        }
        Ok(())
    }

    fn on_agent_card_query(&self, agent_url: &str) -> AgentCard {
        AgentCard::new("report-agent", "Writes reports", "1.0.0", agent_url)
            .with_streaming(true)
            .with_push_notifications(true)
    }
}

struct TestServer {
    base_url: String,
    shutdown: CancellationToken,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn start_server() -> TestServer {
    let manager = TaskManager::builder(Arc::new(InMemoryTaskStore::new()))
        .with_agent(ReportAgent)
        .build();
    let shutdown = CancellationToken::new();
    let server = A2AServer::builder(manager)
        .with_base_path("/a2a")
        .with_shutdown_token(shutdown.clone())
        .build();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server.serve_with_listener(listener));

    TestServer {
        base_url: format!("http://{addr}/a2a"),
        shutdown,
    }
}

async fn connect(server: &TestServer) -> A2AClient {
    A2AClient::from_card_url(&server.base_url).await.unwrap()
}

async fn collect(stream: A2AEventStream) -> Vec<SendStreamingMessageResult> {
    tokio::time::timeout(Duration::from_secs(5), stream.collect::<Vec<_>>())
        .await
        .expect("event stream should terminate")
        .into_iter()
        .map(|item| item.unwrap())
        .collect()
}

#[tokio::test]
async fn test_discovers_agent_card() {
    let server = start_server().await;
    let client = connect(&server).await;

    assert_eq!(client.agent_card().name, "report-agent");
    assert_eq!(client.endpoint(), server.base_url);
    assert_eq!(client.agent_card().capabilities.streaming, Some(true));

    let fresh = client.fetch_agent_card(&server.base_url).await.unwrap();
    assert_eq!(fresh.url, server.base_url);
}

#[tokio::test]
async fn test_send_message_and_get_task() {
    let server = start_server().await;
    let client = connect(&server).await;

    let result = client
        .send_message(MessageSendParams::new(Message::user_text("hello")))
        .await
        .unwrap();
    let task = result.as_task().expect("a task").clone();
    assert_eq!(task.status.state, TaskState::Completed);
    assert_eq!(task.status.message.as_ref().unwrap().text(), "hi there");

    let fetched = client
        .get_task(TaskQueryParams::new(&task.id))
        .await
        .unwrap();
    assert_eq!(fetched.id, task.id);
    assert_eq!(fetched.history.len(), 1);

    let mut query = TaskQueryParams::new(&task.id);
    query.history_length = Some(0);
    let trimmed = client.get_task(query).await.unwrap();
    assert!(trimmed.history.is_empty());
}

#[tokio::test]
async fn test_streaming_message_ends_with_final_status() {
    let server = start_server().await;
    let client = connect(&server).await;

    let stream = client
        .send_streaming_message(MessageSendParams::new(Message::user_text("report")))
        .await
        .unwrap();
    let items = collect(stream).await;

    assert_eq!(items.len(), 3);
    assert!(matches!(
        &items[0],
        SendStreamingMessageResult::TaskStatusUpdate(update)
            if update.status.state == TaskState::Working && !update.is_final
    ));
    match &items[1] {
        SendStreamingMessageResult::TaskArtifactUpdate(update) => {
            assert_eq!(update.artifact.artifact_id, "report");
        }
        other => panic!("unexpected item {other:?}"),
    }
    assert!(items[2].is_final());

    let task_id = match &items[2] {
        SendStreamingMessageResult::TaskStatusUpdate(update) => update.task_id.clone(),
        other => panic!("unexpected item {other:?}"),
    };
    let task = client.get_task(TaskQueryParams::new(task_id)).await.unwrap();
    assert_eq!(task.status.state, TaskState::Completed);
    assert_eq!(task.artifacts.len(), 1);
}

#[tokio::test]
async fn test_cancel_task() {
    let server = start_server().await;
    let client = connect(&server).await;

    let result = client
        .send_message(MessageSendParams::new(Message::user_text("park this")))
        .await
        .unwrap();
    let task = result.as_task().expect("a task");
    assert_eq!(task.status.state, TaskState::Submitted);

    let canceled = client
        .cancel_task(TaskIdParams::new(&task.id))
        .await
        .unwrap();
    assert_eq!(canceled.status.state, TaskState::Canceled);
}

#[tokio::test]
async fn test_remote_errors_keep_their_codes() {
    let server = start_server().await;
    let client = connect(&server).await;

    let err = client
        .get_task(TaskQueryParams::new("missing"))
        .await
        .unwrap_err();
    assert!(matches!(err, A2AError::RemoteAgent { code: -32001, .. }));

    let err = client
        .cancel_task(TaskIdParams::new("missing"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(-32001));

    // Rejected before any event is streamed, so it arrives as plain JSON.
    let err = client
        .resubscribe_task(TaskIdParams::new("missing"))
        .await
        .err()
        .unwrap();
    assert_eq!(err.code(), Some(-32001));
}

#[tokio::test]
async fn test_push_notification_config_roundtrip() {
    let server = start_server().await;
    let client = connect(&server).await;

    let config = TaskPushNotificationConfig::new(
        "task-1",
        PushNotificationConfig::new("https://hooks.example.com/a2a"),
    );
    let stored = client
        .set_task_push_notification_config(config.clone())
        .await
        .unwrap();
    assert_eq!(stored, config);

    let fetched = client
        .get_task_push_notification_config(TaskIdParams::new("task-1"))
        .await
        .unwrap();
    assert_eq!(fetched, config);

    let err = client
        .get_task_push_notification_config(TaskIdParams::new("task-2"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(-32001));

    let invalid = TaskPushNotificationConfig::new(
        "task-1",
        PushNotificationConfig::new("ftp://hooks.example.com"),
    );
    let err = client
        .set_task_push_notification_config(invalid)
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(-32602));
}

#[tokio::test]
async fn test_unreachable_agent_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = A2AClient::from_card_url(format!("http://{addr}"))
        .await
        .unwrap_err();
    assert!(matches!(err, A2AError::Network { .. }));
}
