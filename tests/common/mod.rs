//! Shared helpers for the runtime integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use a2a_runtime::{AgentHandler, InMemoryTaskStore, TaskEvent, TaskEventStream, TaskManager};
use futures::StreamExt;

pub fn manager_with(agent: impl AgentHandler + 'static) -> TaskManager {
    TaskManager::builder(Arc::new(InMemoryTaskStore::new()))
        .with_agent(agent)
        .build()
}

/// Drain a stream, failing the test if it does not end in time.
pub async fn collect_events(stream: TaskEventStream) -> Vec<TaskEvent> {
    tokio::time::timeout(Duration::from_secs(5), stream.collect::<Vec<_>>())
        .await
        .expect("event stream should terminate")
}
