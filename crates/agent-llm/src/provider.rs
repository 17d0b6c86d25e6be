//! Provider traits

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// A chat completion backend
///
/// Query generation, classification, answers and plans all go through this
/// trait; tests substitute scripted implementations.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Short backend name used in logs, e.g. `openai`
    fn name(&self) -> &str;
}

/// A text embedding backend, used for similarity ranking
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// One vector per input, in input order
    async fn embed(&self, model: &str, inputs: &[String]) -> Result<Vec<Vec<f32>>>;
}
