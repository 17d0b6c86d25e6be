//! Conversational investment agent
//!
//! Each user turn goes through an optional relevance classifier, a semantic
//! parser that writes a SUQL query, a post-processor that repairs the query
//! text, a hybrid executor that runs it against PostgreSQL (delegating
//! free-text functions to the free-text function server), a shaper that
//! prepares the rows for the model, and finally answer generation.
//!
//! # Quick Start
//!
//! ```no_run
//! use agent_suql::{Agent, DialogueHistory};
//! use agent_utils::AppConfig;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let app = AppConfig::from_env()?;
//! let agent = Agent::from_app_config(&app)?;
//! let mut history = DialogueHistory::new();
//!
//! let turn = agent
//!     .compute_next_turn(&mut history, "Show me ETFs with 5 day return above 10.")
//!     .await;
//! println!("{}", turn.agent_utterance().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dialogue;
pub mod error;
pub mod executor;
pub mod generate;
pub mod orchestrator;
pub mod postprocess;
pub mod shaper;
pub mod tokens;

pub use config::{AgentConfig, CallSettings, ExecutionTarget};
pub use dialogue::{DialogueHistory, DialogueTurn, Stage, TimeStatement, dialogue_history_to_text};
pub use error::{Result, SuqlError};
pub use executor::{ExecutionCache, FreeTextClient, HybridExecutor, RelationalStore, SqlValue};
pub use generate::{Generation, GenerationRequest, LlmTextGenerator, TextGenerator};
pub use orchestrator::{Agent, FALLBACK_UTTERANCE};
pub use postprocess::QueryPostProcessor;
pub use shaper::{NedEntry, ResponseShaper, ShapedResults};
pub use tokens::{HeuristicTokenCounter, TiktokenCounter, TokenCounter};
