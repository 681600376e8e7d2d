use a2a_runtime::AgentError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error_mapper;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors of the HTTP transport.
///
/// As a response (REST routes) every variant becomes a status code with a
/// `{"error": message}` body. JSON-RPC calls never use this conversion: they
/// always answer HTTP 200 with a JSON-RPC error object.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::Agent(e) => (error_mapper::http_status(e), error_mapper::public_message(e)),
            Error::Json(e) => (StatusCode::BAD_REQUEST, format!("Invalid JSON body: {e}")),
            Error::Io(e) => {
                tracing::error!(error = %e, "I/O error while serving request");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
