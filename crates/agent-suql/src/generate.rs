//! Template-driven text generation

use crate::config::CallSettings;
use crate::error::{Result, SuqlError};
use agent_llm::{CompletionRequest, LLMProvider, Message};
use agent_prompt::PromptRegistry;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// A prompt template with its bindings and model settings
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub template_id: String,
    pub bindings: serde_json::Value,
    pub model_id: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub stop_sequences: Vec<String>,
    pub top_p: Option<f32>,
}

impl GenerationRequest {
    pub fn new(
        template_id: impl Into<String>,
        bindings: serde_json::Value,
        settings: &CallSettings,
    ) -> Self {
        Self {
            template_id: template_id.into(),
            bindings,
            model_id: settings.model.clone(),
            max_output_tokens: settings.max_tokens,
            temperature: settings.temperature,
            stop_sequences: settings.stop.clone(),
            top_p: settings.top_p,
        }
    }
}

/// Generated text and how long the call took
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    pub elapsed: Duration,
}

/// Produces text from a named template
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<Generation>;
}

/// Cut `text` at the first occurrence of any stop sequence
pub fn truncate_at_stop<'a>(text: &'a str, stop_sequences: &[String]) -> &'a str {
    let cut = stop_sequences
        .iter()
        .filter(|s| !s.is_empty())
        .filter_map(|s| text.find(s.as_str()))
        .min()
        .unwrap_or(text.len());
    &text[..cut]
}

/// [`TextGenerator`] backed by a prompt registry and an LLM provider
pub struct LlmTextGenerator {
    provider: Arc<dyn LLMProvider>,
    prompts: Arc<PromptRegistry>,
    timeout: Duration,
}

impl LlmTextGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>, prompts: Arc<PromptRegistry>, timeout: Duration) -> Self {
        Self {
            provider,
            prompts,
            timeout,
        }
    }

    pub fn prompts(&self) -> &PromptRegistry {
        &self.prompts
    }
}

#[async_trait]
impl TextGenerator for LlmTextGenerator {
    #[instrument(skip(self, request), fields(template = %request.template_id, model = %request.model_id))]
    async fn generate(&self, request: GenerationRequest) -> Result<Generation> {
        let prompt = self.prompts.render(&request.template_id, &request.bindings)?;
        debug!("Prompt for {}:\n{}", request.template_id, prompt);

        let mut builder = CompletionRequest::builder(&request.model_id)
            .add_message(Message::user(prompt))
            .max_tokens(request.max_output_tokens as usize)
            .temperature(request.temperature)
            .stop_sequences(request.stop_sequences.clone());
        if let Some(top_p) = request.top_p {
            builder = builder.top_p(top_p);
        }

        let started = Instant::now();
        let response = tokio::time::timeout(self.timeout, self.provider.complete(builder.build()))
            .await
            .map_err(|_| SuqlError::Timeout {
                stage: request.template_id.clone(),
                after: self.timeout,
            })??;
        let elapsed = started.elapsed();
        if response.is_truncated() {
            warn!(
                "{} hit the {} token limit",
                request.template_id, request.max_output_tokens
            );
        }

        let text = truncate_at_stop(response.message.text(), &request.stop_sequences)
            .trim()
            .to_string();
        if text.is_empty() {
            return Err(SuqlError::Generation(format!(
                "{} produced no text",
                request.template_id
            )));
        }

        debug!(provider = self.provider.name(), elapsed = ?elapsed, "Generated: {}", text);
        Ok(Generation { text, elapsed })
    }
}
