//! Server-side runtime for the A2A task protocol.
//!
//! The [`TaskManager`] owns the task lifecycle: it persists tasks through a
//! [`TaskStore`], invokes the [`AgentHandler`] hooks and feeds live
//! [`TaskEvent`]s to subscribers. Transports such as `a2a-axum` only translate
//! wire requests into manager calls.

pub mod agents;
pub mod config;
pub mod errors;
pub mod events;
pub mod logging;
pub mod task;

pub use a2a_types as types;

pub use agents::{AgentHandler, NoopAgent};
pub use config::{RuntimeConfig, TaskManagerConfig, TransitionPolicy};
pub use errors::{AgentError, AgentResult};
pub use events::{TaskEvent, TaskEventStream};
pub use task::{InMemoryTaskStore, TaskManager, TaskStore};
