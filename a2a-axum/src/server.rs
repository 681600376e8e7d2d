use std::net::SocketAddr;

use a2a_runtime::config::ServerSettings;
use a2a_runtime::TaskManager;
use a2a_types::AgentCard;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::Result;
use crate::routes::{create_routes, ServerState};

/// A2A protocol server for a [`TaskManager`]
pub struct A2AServer {
    manager: TaskManager,
    settings: ServerSettings,
    shutdown: CancellationToken,
}

impl A2AServer {
    /// Create a new A2A server builder
    pub fn builder(manager: TaskManager) -> A2AServerBuilder {
        A2AServerBuilder::new(manager)
    }

    pub fn settings(&self) -> &ServerSettings {
        &self.settings
    }

    /// Token that stops the server and ends every open stream when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// URL advertised in the agent card: the configured one, or one derived
    /// from `addr` and the base path.
    fn agent_url(&self, addr: &str) -> String {
        if let Some(url) = &self.settings.agent_url {
            return url.clone();
        }
        match self.settings.normalized_base_path().as_str() {
            "" => format!("http://{addr}/"),
            base_path => format!("http://{addr}{base_path}"),
        }
    }

    /// Display server startup information including agent card details
    fn display_server_info(&self, local_addr: &SocketAddr, agent_card: &AgentCard) {
        let base_path = self.settings.normalized_base_path();

        tracing::info!("A2A server listening at http://{}{}", local_addr, base_path);
        tracing::info!("Agent: {} ({})", agent_card.name, agent_card.description);
        tracing::info!(
            "Agent card available at http://{}{}/.well-known/agent.json",
            local_addr,
            base_path
        );
        tracing::info!(
            version = %agent_card.version,
            url = %agent_card.url,
            streaming = ?agent_card.capabilities.streaming,
            push_notifications = ?agent_card.capabilities.push_notifications,
            skills = agent_card.skills.len(),
            "Agent card details"
        );
        for skill in &agent_card.skills {
            tracing::info!("  skill: {} ({})", skill.name, skill.id);
        }
    }

    /// Validate agent card configuration and warn about potential issues
    fn validate_agent_card(&self, agent_card: &AgentCard) {
        let mut warnings = Vec::new();

        if agent_card.name.is_empty() {
            warnings.push("AgentCard name is empty".to_string());
        }
        if agent_card.version.is_empty() {
            warnings.push(
                "Version is empty; other agents may have trouble identifying compatibility"
                    .to_string(),
            );
        }
        if agent_card.url.is_empty() {
            warnings.push(
                "URL is empty; other agents will not know how to reach this agent".to_string(),
            );
        }
        if agent_card.capabilities.streaming != Some(true) {
            warnings.push("Streaming capability is not advertised".to_string());
        }
        if self.settings.agent_url.is_none() {
            warnings.push(format!(
                "No agent_url configured; advertising {}",
                agent_card.url
            ));
        }

        for warning in &warnings {
            tracing::warn!("AgentCard: {}", warning);
        }
    }

    fn state(&self, agent_url: String) -> ServerState {
        ServerState {
            manager: self.manager.clone(),
            agent_url,
            keep_alive: self.settings.keep_alive(),
            shutdown: self.shutdown.clone(),
        }
    }

    /// Convert the server into an Axum router
    pub fn into_router(self) -> Router {
        let agent_url = self.agent_url(&self.settings.bind_address);
        self.router_with_url(agent_url)
    }

    fn router_with_url(&self, agent_url: String) -> Router {
        create_routes(self.state(agent_url), &self.settings.normalized_base_path())
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
    }

    /// Bind the configured address and serve until Ctrl-C or the shutdown
    /// token fires.
    pub async fn serve(self) -> Result<()> {
        let listener = TcpListener::bind(&self.settings.bind_address).await?;
        self.serve_with_listener(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve_with_listener(self, listener: TcpListener) -> Result<()> {
        let local_addr = listener.local_addr()?;
        let agent_url = self.agent_url(&local_addr.to_string());

        let agent_card = self.manager.agent_card(&agent_url);
        self.display_server_info(&local_addr, &agent_card);
        self.validate_agent_card(&agent_card);

        let app = self.router_with_url(agent_url);
        let shutdown = self.shutdown.clone();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("A2A server stopped");
        Ok(())
    }
}

/// Resolves on Ctrl-C or when `token` is cancelled. Cancels `token` either way
/// so open event streams end and the graceful shutdown can complete.
async fn shutdown_signal(token: CancellationToken) {
    tokio::select! {
        _ = token.cancelled() => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                token.cancelled().await;
            }
        }
    }
    tracing::info!("Shutting down A2A server");
    token.cancel();
}

/// Builder for configuring an A2A server
pub struct A2AServerBuilder {
    manager: TaskManager,
    settings: ServerSettings,
    shutdown: Option<CancellationToken>,
}

impl A2AServerBuilder {
    fn new(manager: TaskManager) -> Self {
        Self {
            manager,
            settings: ServerSettings::default(),
            shutdown: None,
        }
    }

    /// Replace all transport settings at once (e.g. from `RuntimeConfig::server`)
    pub fn with_settings(mut self, settings: ServerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_bind_address(mut self, bind_address: impl Into<String>) -> Self {
        self.settings.bind_address = bind_address.into();
        self
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.settings.base_path = base_path.into();
        self
    }

    pub fn with_agent_url(mut self, agent_url: impl Into<String>) -> Self {
        self.settings.agent_url = Some(agent_url.into());
        self
    }

    pub fn with_keep_alive_secs(mut self, secs: u64) -> Self {
        self.settings.keep_alive_secs = secs;
        self
    }

    /// Use an external token to stop the server.
    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    /// Build the A2A server
    pub fn build(self) -> A2AServer {
        A2AServer {
            manager: self.manager,
            settings: self.settings,
            shutdown: self.shutdown.unwrap_or_default(),
        }
    }
}
