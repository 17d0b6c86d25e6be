//! Error types for the conversational agent core

use std::time::Duration;
use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, SuqlError>;

/// Errors raised inside a single turn's pipeline
///
/// None of these escape [`Agent::compute_next_turn`](crate::Agent::compute_next_turn);
/// they are logged there and the turn falls back to the no-results answer.
#[derive(Debug, Error)]
pub enum SuqlError {
    /// Text generation failed or produced nothing usable
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Model provider error
    #[error("LLM error: {0}")]
    Llm(#[from] agent_llm::LLMError),

    /// Template lookup or rendering failed
    #[error("Prompt error: {0}")]
    Prompt(#[from] agent_prompt::PromptError),

    /// Relational store failure, including malformed queries
    #[error("Query execution failed: {0}")]
    Execution(String),

    /// Free-text function server failure
    #[error("Free-text function failed: {0}")]
    FreeText(String),

    /// A structured response did not decode
    #[error("Could not decode response ({detail}): {raw}")]
    Decode {
        detail: String,
        raw: String,
    },

    /// A capability call exceeded the configured timeout
    #[error("{stage} timed out after {after:?}")]
    Timeout {
        stage: String,
        after: Duration,
    },

    /// Invalid agent configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for SuqlError {
    fn from(err: sqlx::Error) -> Self {
        SuqlError::Execution(err.to_string())
    }
}

impl From<reqwest::Error> for SuqlError {
    fn from(err: reqwest::Error) -> Self {
        SuqlError::FreeText(err.to_string())
    }
}

impl From<agent_utils::ConfigError> for SuqlError {
    fn from(err: agent_utils::ConfigError) -> Self {
        SuqlError::Config(err.to_string())
    }
}
