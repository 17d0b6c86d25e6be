//! Error types for investment planning

use agent_llm::LLMError;
use agent_prompt::PromptError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    /// Model call failed
    #[error("LLM error: {0}")]
    Llm(#[from] LLMError),

    /// Template missing or failed to render
    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),

    /// Draft plan was not the expected JSON
    #[error("Could not decode draft plan: {detail}")]
    Decode { detail: String, raw: String },

    /// A category processor failed
    #[error("Processing {category} failed: {reason}")]
    Processing { category: String, reason: String },

    /// Model call exceeded its deadline
    #[error("{template} timed out after {after:?}")]
    Timeout { template: String, after: Duration },
}

pub type Result<T> = std::result::Result<T, PlanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_keeps_detail_in_message() {
        let err = PlanError::Decode {
            detail: "expected value at line 1".into(),
            raw: "Sure! Here is".into(),
        };
        assert_eq!(
            err.to_string(),
            "Could not decode draft plan: expected value at line 1"
        );
    }
}
