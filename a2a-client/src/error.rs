//! Error types for A2A client operations

use a2a_types::JSONRPCError;
use thiserror::Error;

/// Main error type for A2A client operations
#[derive(Debug, Error)]
pub enum A2AError {
    /// Network communication error or unexpected HTTP response
    #[error("Network error: {message}")]
    Network { message: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Remote agent answered with a JSON-RPC error
    #[error("Remote agent error {code}: {message}")]
    RemoteAgent {
        code: i32,
        message: String,
        data: Option<serde_json::Value>,
    },

    /// Invalid configuration or parameters
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },
}

impl A2AError {
    /// JSON-RPC error code, for errors reported by the remote agent.
    pub fn code(&self) -> Option<i32> {
        match self {
            A2AError::RemoteAgent { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Convenience type alias for Results with A2AError
pub type A2AResult<T> = std::result::Result<T, A2AError>;

impl From<JSONRPCError> for A2AError {
    fn from(error: JSONRPCError) -> Self {
        A2AError::RemoteAgent {
            code: error.code,
            message: error.message,
            data: error.data,
        }
    }
}

// Conversion from reqwest::Error
impl From<reqwest::Error> for A2AError {
    fn from(error: reqwest::Error) -> Self {
        A2AError::Network {
            message: error.to_string(),
        }
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for A2AError {
    fn from(error: serde_json::Error) -> Self {
        A2AError::Serialization {
            message: error.to_string(),
        }
    }
}
