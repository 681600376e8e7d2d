//! Constants for the A2A client

/// Path of the agent card, relative to the agent's base URL
pub const AGENT_CARD_PATH: &str = ".well-known/agent.json";

/// Content type of streaming responses
pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";
