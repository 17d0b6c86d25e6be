//! Model access for invest-agent-rs
//!
//! [`LLMProvider`] sends one prompt and returns the reply; [`EmbeddingProvider`]
//! turns documents into vectors. The `openai` feature adds a provider for
//! OpenAI and any server speaking the same API.

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

#[cfg(feature = "openai")]
pub mod providers;

pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::{EmbeddingProvider, LLMProvider};
