//! Axum transport for the A2A task runtime.
//!
//! Serves a [`TaskManager`](a2a_runtime::TaskManager) over JSON-RPC 2.0 with
//! SSE streaming, plus a REST companion surface and agent card discovery.

pub mod error;
pub mod error_mapper;
pub mod json_rpc;
pub mod routes;
pub mod server;
pub mod sse;

pub use error::{Error, Result};
pub use routes::{create_routes, ServerState};
pub use server::{A2AServer, A2AServerBuilder};
