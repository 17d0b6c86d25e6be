//! Completion request and response types
//!
//! Every call in this workspace sends one rendered prompt and reads back one
//! text reply, so a request is little more than messages plus sampling
//! settings.

use crate::Message;
use serde::{Deserialize, Serialize};

/// One chat completion call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    /// Upper bound on generated tokens
    pub max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Generation halts before any of these; `None` when there are none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
}

/// The model's reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub message: Message,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// True when the reply was cut off by `max_tokens`
    pub fn is_truncated(&self) -> bool {
        self.stop_reason == StopReason::MaxTokens
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Finished on its own or at a stop sequence
    EndTurn,
    /// Ran into `max_tokens`
    MaxTokens,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl CompletionRequest {
    pub fn builder(model: impl Into<String>) -> CompletionRequestBuilder {
        CompletionRequestBuilder::new(model)
    }
}

/// Builder for [`CompletionRequest`]; temperature defaults to unset
pub struct CompletionRequestBuilder {
    request: CompletionRequest,
}

impl CompletionRequestBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            request: CompletionRequest {
                model: model.into(),
                messages: Vec::new(),
                max_tokens: 1024,
                temperature: None,
                top_p: None,
                stop_sequences: None,
            },
        }
    }

    pub fn add_message(mut self, message: Message) -> Self {
        self.request.messages.push(message);
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.request.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.request.temperature = Some(temperature);
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.request.top_p = Some(top_p);
        self
    }

    /// An empty list means no stop sequences
    pub fn stop_sequences(mut self, sequences: Vec<String>) -> Self {
        self.request.stop_sequences = (!sequences.is_empty()).then_some(sequences);
        self
    }

    pub fn build(self) -> CompletionRequest {
        self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let request = CompletionRequest::builder("gpt-3.5-turbo-0125")
            .add_message(Message::user("Show me ETFs"))
            .max_tokens(300)
            .temperature(0.0)
            .stop_sequences(vec!["Agent:".to_string()])
            .build();

        assert_eq!(request.model, "gpt-3.5-turbo-0125");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.max_tokens, 300);
        assert_eq!(request.temperature, Some(0.0));
        assert_eq!(request.top_p, None);
        assert_eq!(request.stop_sequences, Some(vec!["Agent:".to_string()]));
    }

    #[test]
    fn test_empty_stop_sequences_are_omitted() {
        let request = CompletionRequest::builder("m")
            .stop_sequences(Vec::new())
            .build();
        assert!(request.stop_sequences.is_none());

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("stop_sequences").is_none());
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_truncation() {
        let response = CompletionResponse {
            message: Message::assistant("SELECT * FROM"),
            stop_reason: StopReason::MaxTokens,
            usage: TokenUsage::default(),
        };
        assert!(response.is_truncated());
    }
}
