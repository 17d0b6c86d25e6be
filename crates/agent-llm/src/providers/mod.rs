//! Concrete LLM provider implementations
//!
//! This module contains implementations of the provider traits for
//! OpenAI-compatible services.

pub mod openai;

pub use openai::{OpenAIConfig, OpenAIProvider};
