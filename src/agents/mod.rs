//! Agent side of the runtime: the hooks a [`TaskManager`](crate::task::TaskManager)
//! calls when tasks are created, updated or canceled.

pub mod agent_handler;

pub use agent_handler::{AgentHandler, NoopAgent};
