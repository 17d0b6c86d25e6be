//! Free-text function server
//!
//! Serves the `answer` and `summary` functions that the hybrid executor
//! delegates to for unstructured columns.
//!
//! - `POST /answer` `{text, question, type_prompt?}` returns `{result}`
//! - `POST /summary` `{text}` returns `{result}`
//! - `GET /health` returns `{status: "ok"}`

pub mod config;
pub mod engine;
pub mod error;
pub mod ranking;
pub mod routes;

pub use config::ServerConfig;
pub use engine::{FreeTextEngine, NO_INFORMATION};
pub use error::{Result, ServerError};
pub use ranking::{EmbeddingRanker, SimilarityRanker, cosine_similarity};
pub use routes::{AppState, build_router};
