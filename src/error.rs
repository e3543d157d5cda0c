use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures that happen before the response stream is handed to the transport.
/// Each one maps to a status code and a JSON `{"error": ...}` body.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("API_KEY environment variable not set")]
    MissingCredential,

    #[error("Failed to initialize generation client: {0}")]
    ClientInit(String),

    #[error("{0}")]
    UpstreamCall(String),

    #[error("{0}")]
    Unhandled(String),
}

impl ChatError {
    pub fn status(&self) -> StatusCode {
        match self {
            ChatError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ChatError::MissingCredential
            | ChatError::ClientInit(_)
            | ChatError::UpstreamCall(_)
            | ChatError::Unhandled(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("❌ Chat request failed ({}): {}", status.as_u16(), self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// The upstream sequence failed to produce further chunks.
/// The response status is already committed, so this can only end the body.
#[derive(Debug, Clone, Error)]
pub enum StreamError {
    #[error("upstream stream read failed: {0}")]
    Transport(String),

    #[error("upstream reported an error mid-stream: {0}")]
    Upstream(String),
}

/// A single chunk could not be interpreted. Recovered by skipping the chunk.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChunkError {
    #[error("chunk payload is not JSON: {0}")]
    Unparseable(String),

    #[error("unexpected chunk shape: {0}")]
    Shape(String),
}
