//! # A2A Protocol Client
//!
//! This crate provides a client for calling remote A2A (Agent-to-Agent) protocol compliant agents.
//! It supports both streaming and non-streaming interactions over HTTP/HTTPS.
//!
//! ## Features
//!
//! - JSON-RPC 2.0 calls for every A2A task method
//! - Streaming responses decoded from Server-Sent Events
//! - Agent discovery via agent cards
//! - Remote JSON-RPC errors surfaced with their error codes
//!
//! ## Example
//!
//! ```rust,no_run
//! use a2a_client::A2AClient;
//! use a2a_types::{Message, MessageSendParams};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = A2AClient::from_card_url("https://agent.example.com").await?;
//!
//! let params = MessageSendParams::new(Message::user_text("Hello!"));
//! let result = client.send_message(params).await?;
//! if let Some(task) = result.as_task() {
//!     println!("task {} is {:?}", task.id, task.status.state);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod constants;
pub mod error;
pub mod sse;

pub use client::{A2AClient, A2AEventStream};
pub use error::{A2AError, A2AResult};
