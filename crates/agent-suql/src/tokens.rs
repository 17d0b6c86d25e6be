//! Token counting used for prompt budgets

use crate::error::{Result, SuqlError};
use tiktoken_rs::CoreBPE;

/// Counts tokens in a piece of text
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

/// Four characters per token, rounded up
///
/// A rough, tokenizer-free estimate. Digit-heavy JSON can run over it.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTokenCounter;

impl TokenCounter for HeuristicTokenCounter {
    fn count(&self, text: &str) -> usize {
        text.chars().count().div_ceil(4)
    }
}

/// BPE token counts with the `cl100k_base` encoding
///
/// Budgets such as the 3500-token result limit are expressed in these
/// tokens.
pub struct TiktokenCounter {
    bpe: CoreBPE,
}

impl TiktokenCounter {
    pub fn cl100k() -> Result<Self> {
        let bpe = tiktoken_rs::cl100k_base()
            .map_err(|e| SuqlError::Config(format!("cl100k_base encoding unavailable: {e}")))?;
        Ok(Self { bpe })
    }
}

impl TokenCounter for TiktokenCounter {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }
}
