//! Prompt template management for invest-agent-rs
//!
//! Every model call in the workspace is driven by a named Jinja2 template.
//! Templates are registered in a [`PromptRegistry`] and rendered with a JSON
//! object of bindings.
//!
//! [`defaults`] holds a built-in template for every id the agent and the
//! planner use; with the `file-loader` feature, `<id>.prompt` files in a
//! prompt directory replace them.
//!
//! ```
//! use agent_prompt::defaults::{self, ids};
//!
//! let registry = defaults::default_registry().unwrap();
//! assert!(registry.contains(ids::PARSER_SUQL));
//! ```

pub mod defaults;
mod error;
mod jinja;
mod registry;
mod template;

#[cfg(feature = "file-loader")]
mod loader;

pub use error::{PromptError, Result};
pub use jinja::{JinjaTemplate, unreplaced_placeholders};
pub use registry::PromptRegistry;
pub use template::PromptTemplate;

#[cfg(feature = "file-loader")]
pub use loader::FileLoader;
