//! OpenAI provider implementation
//!
//! This module implements [`LLMProvider`] and [`EmbeddingProvider`] for
//! OpenAI's chat completion and embeddings endpoints.
//! See: https://platform.openai.com/docs/api-reference/chat
//!
//! # Examples
//!
//! ```no_run
//! use agent_llm::{CompletionRequest, Message, LLMProvider};
//! use agent_llm::providers::{OpenAIConfig, OpenAIProvider};
//! use agent_utils::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = AppConfig::from_env()?;
//!     let provider = OpenAIProvider::with_config(OpenAIConfig::from_app_config(&app))?;
//!
//!     let request = CompletionRequest::builder("gpt-3.5-turbo-0125")
//!         .add_message(Message::user("Which ETFs track the S&P 500?"))
//!         .max_tokens(100)
//!         .temperature(0.0)
//!         .build();
//!
//!     let response = provider.complete(request).await?;
//!     println!("{}", response.message.text());
//!     Ok(())
//! }
//! ```
//!
//! Any OpenAI-compatible server (vLLM, llama.cpp, Azure OpenAI) works by
//! pointing [`OpenAIConfig::with_api_base`] at it.

use crate::{
    CompletionRequest, CompletionResponse, EmbeddingProvider, LLMError, LLMProvider, Message,
    Result, Role, StopReason, TokenUsage,
};
use agent_utils::AppConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for OpenAI provider
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication
    pub api_key: String,

    /// Base URL for the OpenAI API (default: "https://api.openai.com/v1")
    pub api_base: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,
}

impl OpenAIConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Derive provider settings from the process configuration
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(config.openai_api_key.clone())
            .with_api_base(config.openai_api_base.clone())
            .with_timeout(config.capability_timeout.as_secs().max(1))
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// OpenAI provider
///
/// Serves both chat completions (query generation, classification, answers)
/// and embeddings (similarity ranking in the free-text server).
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider with custom configuration
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LLMError::ConfigurationError(
                "API key must not be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        model: &str,
    ) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(format!("{}/{path}", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let error_text = response.text().await?;

        Err(match status.as_u16() {
            401 => LLMError::AuthenticationFailed,
            429 => LLMError::RateLimitExceeded(error_text),
            400 => LLMError::InvalidRequest(error_text),
            404 => LLMError::ModelNotFound(model.to_string()),
            _ => LLMError::RequestFailed(format!("HTTP {status}: {error_text}")),
        })
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    #[instrument(skip(self, request), fields(model = %request.model, api_base = %self.config.api_base))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!("Sending chat completion request");

        let openai_request = ChatRequest {
            messages: build_messages(&request.messages),
            model: request.model.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
            stop: request.stop_sequences,
        };

        let response = self
            .post("chat/completions", &openai_request, &request.model)
            .await?;

        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            LLMError::UnexpectedResponse(format!("Failed to parse response: {e}; body: {body}"))
        })?;

        let choice = parsed.choices.into_iter().next().ok_or_else(|| {
            LLMError::UnexpectedResponse("No choices in response".to_string())
        })?;

        let usage = parsed.usage.unwrap_or_default();
        debug!(
            "Received response - stop_reason: {}, tokens: {}/{}",
            choice.finish_reason.as_deref().unwrap_or("unknown"),
            usage.prompt_tokens,
            usage.completion_tokens
        );

        Ok(CompletionResponse {
            message: Message::assistant(choice.message.content.unwrap_or_default()),
            stop_reason: map_stop_reason(choice.finish_reason.as_deref()),
            usage: TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
        })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    #[instrument(skip(self, inputs), fields(model = %model, count = inputs.len()))]
    async fn embed(&self, model: &str, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: model.to_string(),
            input: inputs.to_vec(),
        };

        let response = self.post("embeddings", &request, model).await?;
        let body = response.text().await?;
        let parsed: EmbeddingResponse = serde_json::from_str(&body).map_err(|e| {
            LLMError::UnexpectedResponse(format!("Failed to parse embeddings: {e}; body: {body}"))
        })?;

        order_embeddings(parsed.data, inputs.len())
    }
}

// ============================================================================
// OpenAI-specific request types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

// ============================================================================
// OpenAI-specific response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

// ============================================================================
// Conversion functions
// ============================================================================

fn build_messages(messages: &[Message]) -> Vec<ChatMessage> {
    messages
        .iter()
        .map(|msg| ChatMessage {
            role: match msg.role {
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::System => "system",
            },
            content: msg.content.clone(),
        })
        .collect()
}

/// The API may return embeddings out of order; `index` is authoritative
fn order_embeddings(data: Vec<EmbeddingData>, expected: usize) -> Result<Vec<Vec<f32>>> {
    if data.len() != expected {
        return Err(LLMError::EmbeddingCount {
            expected,
            got: data.len(),
        });
    }

    let mut slots: Vec<Option<Vec<f32>>> = vec![None; expected];
    for item in data {
        let slot = slots.get_mut(item.index).ok_or_else(|| {
            LLMError::UnexpectedResponse(format!("embedding index {} out of range", item.index))
        })?;
        *slot = Some(item.embedding);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(i, slot)| {
            slot.ok_or_else(|| LLMError::UnexpectedResponse(format!("missing embedding {i}")))
        })
        .collect()
}

/// Map OpenAI stop reason to our format
fn map_stop_reason(reason: Option<&str>) -> StopReason {
    match reason {
        Some("stop") => StopReason::EndTurn,
        Some("length") => StopReason::MaxTokens,
        other => {
            debug!("Unmapped stop reason: {:?}", other);
            StopReason::EndTurn
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
