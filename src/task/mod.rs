//! Task management.
//!
//! - `TaskStore`: persistence abstraction for tasks and push notification configs
//! - `InMemoryTaskStore`: `DashMap`-backed store for development and tests
//! - `TaskManager`: lifecycle operations, agent hooks and live events
//! - `TaskLocks`: per-task serialization used by the manager

pub mod in_memory_task_store;
pub mod locks;
pub mod task_manager;
pub mod task_store;

pub use in_memory_task_store::InMemoryTaskStore;
pub use locks::TaskLocks;
pub use task_manager::{TaskManager, TaskManagerBuilder};
pub use task_store::TaskStore;
