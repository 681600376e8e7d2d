//! A2A Client for calling remote A2A agents
//!
//! This module provides a client for making A2A protocol calls to remote agents.
//! It supports both streaming and non-streaming interactions.

use crate::constants::{AGENT_CARD_PATH, EVENT_STREAM_CONTENT_TYPE};
use crate::error::{A2AError, A2AResult};
use crate::sse;
use a2a_types::methods;
use a2a_types::{
    AgentCard, JSONRPCErrorResponse, JSONRPCId, JSONRPCRequest, JSONRPCResponse,
    MessageSendParams, SendMessageResult, SendStreamingMessageResult, Task, TaskIdParams,
    TaskPushNotificationConfig, TaskQueryParams,
};
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Items of a `message/stream` or `tasks/resubscribe` call. The stream ends
/// after the final status update.
pub type A2AEventStream = Pin<Box<dyn Stream<Item = A2AResult<SendStreamingMessageResult>> + Send>>;

/// A2A client for communicating with remote agents
#[derive(Clone)]
pub struct A2AClient {
    /// HTTP client for making requests
    client: Client,
    /// Service endpoint URL from agent card
    service_endpoint_url: String,
    /// Request ID counter for JSON-RPC requests
    request_id_counter: Arc<AtomicU64>,
    /// Cached agent card
    agent_card: Arc<AgentCard>,
}

impl std::fmt::Debug for A2AClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("A2AClient")
            .field("service_endpoint_url", &self.service_endpoint_url)
            .field("agent", &self.agent_card.name)
            .finish()
    }
}

impl A2AClient {
    /// Create a new A2A client from an agent card URL
    ///
    /// This will fetch the agent card from the specified URL and use the
    /// service endpoint URL from the card for all subsequent requests.
    ///
    /// Uses a default `reqwest::Client` for HTTP requests. For custom HTTP
    /// configuration, use `from_card_url_with_client()`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use a2a_client::A2AClient;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = A2AClient::from_card_url("https://agent.example.com").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn from_card_url(base_url: impl AsRef<str>) -> A2AResult<Self> {
        Self::from_card_url_with_client(base_url, Client::new()).await
    }

    /// Create a new A2A client from an agent card URL with a custom HTTP client
    pub async fn from_card_url_with_client(
        base_url: impl AsRef<str>,
        http_client: Client,
    ) -> A2AResult<Self> {
        let agent_card = fetch_card(&http_client, base_url.as_ref()).await?;
        Self::from_card_with_client(agent_card, http_client)
    }

    /// Create a new A2A client directly from an agent card
    ///
    /// This is useful when you already have an agent card and don't need to fetch it.
    /// Uses a default `reqwest::Client`. For custom HTTP configuration, use `from_card_with_client()`.
    pub fn from_card(agent_card: AgentCard) -> A2AResult<Self> {
        Self::from_card_with_client(agent_card, Client::new())
    }

    /// Create a new A2A client from an agent card with a custom HTTP client
    ///
    /// This allows you to provide a pre-configured `reqwest::Client` with
    /// custom settings like timeouts, proxies, TLS config, default headers, etc.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use a2a_client::A2AClient;
    /// use a2a_types::AgentCard;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// # fn example(agent_card: AgentCard) -> Result<(), Box<dyn std::error::Error>> {
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()?;
    ///
    /// let client = A2AClient::from_card_with_client(agent_card, http_client)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_card_with_client(agent_card: AgentCard, http_client: Client) -> A2AResult<Self> {
        if agent_card.url.is_empty() {
            return Err(A2AError::InvalidParameter {
                message: "Agent card does not contain a valid 'url' for the service endpoint"
                    .to_string(),
            });
        }

        tracing::debug!(
            agent = %agent_card.name,
            endpoint = %agent_card.url,
            "Created A2A client"
        );

        Ok(Self {
            client: http_client,
            service_endpoint_url: agent_card.url.clone(),
            request_id_counter: Arc::new(AtomicU64::new(1)),
            agent_card: Arc::new(agent_card),
        })
    }

    /// Create a new A2A client from an agent card with custom headers
    ///
    /// This is a convenience method that builds a reqwest::Client with the provided
    /// headers (API keys, bearer tokens) and uses it to create the A2AClient.
    pub fn from_card_with_headers(
        agent_card: AgentCard,
        headers: std::collections::HashMap<String, String>,
    ) -> A2AResult<Self> {
        use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
        use std::str::FromStr;

        let mut header_map = HeaderMap::new();
        for (key, value) in headers {
            let header_name =
                HeaderName::from_str(&key).map_err(|e| A2AError::InvalidParameter {
                    message: format!("Invalid header name '{}': {}", key, e),
                })?;
            let header_value =
                HeaderValue::from_str(&value).map_err(|e| A2AError::InvalidParameter {
                    message: format!("Invalid header value for '{}': {}", key, e),
                })?;
            header_map.insert(header_name, header_value);
        }

        let http_client = Client::builder()
            .default_headers(header_map)
            .build()
            .map_err(|e| A2AError::Network {
                message: format!("Failed to build HTTP client with headers: {}", e),
            })?;

        Self::from_card_with_client(agent_card, http_client)
    }

    /// Get the cached agent card
    pub fn agent_card(&self) -> &AgentCard {
        &self.agent_card
    }

    /// Service endpoint every JSON-RPC call is posted to
    pub fn endpoint(&self) -> &str {
        &self.service_endpoint_url
    }

    /// Fetch a fresh agent card from the base URL
    pub async fn fetch_agent_card(&self, base_url: impl AsRef<str>) -> A2AResult<AgentCard> {
        fetch_card(&self.client, base_url.as_ref()).await
    }

    /// Get the next request ID
    fn next_request_id(&self) -> JSONRPCId {
        let id = self.request_id_counter.fetch_add(1, Ordering::SeqCst);
        JSONRPCId::Integer(id as i64)
    }

    fn build_request<TParams: Serialize>(
        &self,
        method: &str,
        params: TParams,
    ) -> A2AResult<(JSONRPCId, JSONRPCRequest)> {
        let request_id = self.next_request_id();
        let params = serde_json::to_value(params)?;
        let request = JSONRPCRequest::new(request_id.clone(), method, params);
        Ok((request_id, request))
    }

    /// Helper method to make a generic JSON-RPC POST request
    async fn post_rpc_request<TParams, TResult>(
        &self,
        method: &str,
        params: TParams,
    ) -> A2AResult<TResult>
    where
        TParams: Serialize,
        TResult: DeserializeOwned,
    {
        let (request_id, rpc_request) = self.build_request(method, params)?;
        tracing::debug!(method, id = ?request_id, "Sending A2A request");

        let response = self
            .client
            .post(&self.service_endpoint_url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&rpc_request)
            .send()
            .await
            .map_err(|e| A2AError::Network {
                message: format!("Failed to send {} request: {}", method, e),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| A2AError::Network {
            message: format!("Failed to read {} response: {}", method, e),
        })?;

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<JSONRPCErrorResponse>(&body) {
                return Err(error.error.into());
            }
            return Err(A2AError::Network {
                message: format!("HTTP error {}: {}", status, body),
            });
        }

        let json_response: JSONRPCResponse<TResult> =
            serde_json::from_str(&body).map_err(|e| A2AError::Serialization {
                message: format!("Failed to parse {} response: {}", method, e),
            })?;

        // Validate response ID matches request ID
        if let JSONRPCResponse::Success(success) = &json_response {
            if success.id.as_ref() != Some(&request_id) {
                tracing::warn!(
                    method,
                    expected = ?request_id,
                    received = ?success.id,
                    "RPC response ID mismatch"
                );
            }
        }

        json_response.into_result().map_err(A2AError::from)
    }

    /// Open a JSON-RPC call answered with an SSE stream.
    async fn post_stream_request<TParams: Serialize>(
        &self,
        method: &str,
        params: TParams,
    ) -> A2AResult<A2AEventStream> {
        // Check if agent supports streaming
        if !self.agent_card.capabilities.streaming.unwrap_or(false) {
            return Err(A2AError::InvalidParameter {
                message: format!(
                    "Agent does not support streaming (required for {})",
                    method
                ),
            });
        }

        let (request_id, rpc_request) = self.build_request(method, params)?;
        tracing::debug!(method, id = ?request_id, "Opening A2A event stream");

        let response = self
            .client
            .post(&self.service_endpoint_url)
            .header("Content-Type", "application/json")
            .header("Accept", EVENT_STREAM_CONTENT_TYPE)
            .json(&rpc_request)
            .send()
            .await
            .map_err(|e| A2AError::Network {
                message: format!("Failed to send {} request: {}", method, e),
            })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if content_type.starts_with(EVENT_STREAM_CONTENT_TYPE) {
            return Ok(parse_event_stream(response));
        }

        // Errors detected before streaming starts come back as plain JSON.
        let body = response.text().await.unwrap_or_default();
        if let Ok(error) = serde_json::from_str::<JSONRPCErrorResponse>(&body) {
            return Err(error.error.into());
        }
        Err(A2AError::Network {
            message: format!(
                "Expected an event stream for {}, got HTTP {} with content type '{}'",
                method, status, content_type
            ),
        })
    }

    /// Send a message to the remote agent (non-streaming)
    pub async fn send_message(&self, params: MessageSendParams) -> A2AResult<SendMessageResult> {
        self.post_rpc_request(methods::MESSAGE_SEND, params).await
    }

    /// Send a streaming message to the remote agent
    ///
    /// Returns a stream of task updates ending with the final status update.
    pub async fn send_streaming_message(
        &self,
        params: MessageSendParams,
    ) -> A2AResult<A2AEventStream> {
        self.post_stream_request(methods::MESSAGE_STREAM, params)
            .await
    }

    /// Get a specific task from the remote agent
    pub async fn get_task(&self, params: TaskQueryParams) -> A2AResult<Task> {
        self.post_rpc_request(methods::TASKS_GET, params).await
    }

    /// Cancel a task on the remote agent
    pub async fn cancel_task(&self, params: TaskIdParams) -> A2AResult<Task> {
        self.post_rpc_request(methods::TASKS_CANCEL, params).await
    }

    /// Reattach to the live event stream of a running task
    pub async fn resubscribe_task(&self, params: TaskIdParams) -> A2AResult<A2AEventStream> {
        self.post_stream_request(methods::TASKS_RESUBSCRIBE, params)
            .await
    }

    /// Set or update the push notification configuration for a task
    pub async fn set_task_push_notification_config(
        &self,
        params: TaskPushNotificationConfig,
    ) -> A2AResult<TaskPushNotificationConfig> {
        self.post_rpc_request(methods::PUSH_CONFIG_SET, params)
            .await
    }

    /// Get the push notification configuration for a task
    pub async fn get_task_push_notification_config(
        &self,
        params: TaskIdParams,
    ) -> A2AResult<TaskPushNotificationConfig> {
        self.post_rpc_request(methods::PUSH_CONFIG_GET, params)
            .await
    }
}

async fn fetch_card(client: &Client, base_url: &str) -> A2AResult<AgentCard> {
    let base_url = base_url.trim_end_matches('/');
    let card_url = format!("{}/{}", base_url, AGENT_CARD_PATH);

    let response = client
        .get(&card_url)
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| A2AError::Network {
            message: format!("Failed to fetch agent card from {}: {}", card_url, e),
        })?;

    if !response.status().is_success() {
        return Err(A2AError::Network {
            message: format!("Failed to fetch agent card: HTTP {}", response.status()),
        });
    }

    response.json().await.map_err(|e| A2AError::Serialization {
        message: format!("Failed to parse agent card: {}", e),
    })
}

fn parse_event_stream(response: reqwest::Response) -> A2AEventStream {
    let frames = sse::data_frames(response.bytes_stream());

    Box::pin(async_stream::stream! {
        let mut frames = std::pin::pin!(frames);

        while let Some(frame) = frames.next().await {
            match frame.and_then(|data| process_sse_event(&data)) {
                Ok(item) => {
                    let done = item.is_final();
                    yield Ok(item);
                    if done {
                        return;
                    }
                }
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }
    })
}

/// Decode one SSE data payload: a JSON-RPC response wrapping a stream item.
fn process_sse_event(json_data: &str) -> A2AResult<SendStreamingMessageResult> {
    let response: JSONRPCResponse<SendStreamingMessageResult> = serde_json::from_str(json_data)
        .map_err(|e| A2AError::Serialization {
            message: format!("Failed to parse stream event: {}", e),
        })?;
    response.into_result().map_err(A2AError::from)
}
