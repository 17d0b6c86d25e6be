//! Error types for model calls

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LLMError>;

#[derive(Error, Debug)]
pub enum LLMError {
    /// The endpoint answered with an unexpected status
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// 401 from the endpoint
    #[error("Authentication failed, check the API key")]
    AuthenticationFailed,

    /// 429 from the endpoint
    #[error("Rate limited: {0}")]
    RateLimitExceeded(String),

    /// 400 from the endpoint, or a model outside the allowed list
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unknown model: {0}")]
    ModelNotFound(String),

    /// Transport failure or timeout
    #[cfg(feature = "openai")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The body did not have the expected shape
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Embeddings came back for a different number of inputs
    #[error("Expected {expected} embeddings, got {got}")]
    EmbeddingCount { expected: usize, got: usize },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl From<agent_utils::ConfigError> for LLMError {
    fn from(err: agent_utils::ConfigError) -> Self {
        LLMError::ConfigurationError(err.to_string())
    }
}
