//! Echo agent served over A2A.
//!
//! ```bash
//! cargo run -p a2a-axum --example echo_server
//! A2A_BIND_ADDRESS=0.0.0.0:8080 RUST_LOG=debug cargo run -p a2a-axum --example echo_server
//! ```
//!
//! Pass a `.yaml` or `.json` config file as the first argument to override the
//! defaults; `A2A_*` environment variables are applied on top.

use std::sync::Arc;
use std::time::Duration;

use a2a_axum::A2AServer;
use a2a_runtime::config::RuntimeConfig;
use a2a_runtime::logging::init_tracing;
use a2a_runtime::types::{AgentCard, Artifact, Message, Part, Task, TaskState};
use a2a_runtime::{AgentHandler, AgentResult, InMemoryTaskStore, TaskManager};
use async_trait::async_trait;

/// Streams the words of each message back as artifact chunks.
struct EchoAgent;

#[async_trait]
impl AgentHandler for EchoAgent {
    async fn on_task_created(&self, manager: &TaskManager, task: Task) -> AgentResult<()> {
        self.echo(manager, &task).await
    }

    async fn on_task_updated(&self, manager: &TaskManager, task: Task) -> AgentResult<()> {
        self.echo(manager, &task).await
    }

    fn on_agent_card_query(&self, agent_url: &str) -> AgentCard {
        AgentCard::new(
            "Echo Agent",
            "Repeats every message word by word",
            "0.1.0",
            agent_url,
        )
        .with_streaming(true)
        .with_push_notifications(true)
        .add_skill_with("echo", "Echo", |skill| {
            skill
                .with_description("Streams the message back as artifact chunks")
                .add_tag("demo")
                .add_example("hello there")
        })
    }
}

impl EchoAgent {
    async fn echo(&self, manager: &TaskManager, task: &Task) -> AgentResult<()> {
        let text = task.history.last().map(Message::text).unwrap_or_default();
        manager
            .update_status(&task.id, TaskState::Working, None, false)
            .await?;

        let words: Vec<&str> = text.split_whitespace().collect();
        for (i, word) in words.iter().enumerate() {
            let last = i + 1 == words.len();
            manager
                .return_artifact_chunk(
                    &task.id,
                    Artifact::new("echo", vec![Part::text(format!("{word} "))]),
                    i > 0,
                    last,
                )
                .await?;
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        manager
            .update_status(
                &task.id,
                TaskState::InputRequired,
                Some(Message::agent_text(format!("echoed {} words", words.len()))),
                true,
            )
            .await?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => RuntimeConfig::from_file(path)?,
        None => RuntimeConfig::default(),
    }
    .with_env_overrides()?;

    init_tracing(&config.logging)?;

    let manager = TaskManager::builder(Arc::new(InMemoryTaskStore::new()))
        .with_agent(EchoAgent)
        .with_config(config.tasks.clone())
        .build();

    A2AServer::builder(manager)
        .with_settings(config.server)
        .build()
        .serve()
        .await?;
    Ok(())
}
