//! Error types for the free-text function server

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Request is missing a required field
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Similarity ranking failed
    #[error("Ranking failed: {0}")]
    Ranking(String),

    /// Answer generation failed
    #[error("Generation failed: {0}")]
    Generation(#[from] agent_suql::SuqlError),

    /// Embedding provider error
    #[error("Embedding failed: {0}")]
    Embedding(#[from] agent_llm::LLMError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::MissingField(_) => StatusCode::BAD_REQUEST,
            ServerError::Ranking(_) | ServerError::Generation(_) | ServerError::Embedding(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
