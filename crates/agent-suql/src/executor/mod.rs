//! Hybrid query execution
//!
//! A post-processed query is run against the relational store. Calls to the
//! free-text functions `answer(column, 'question')` and `summary(column)` over
//! eligible columns are evaluated through the free-text function server first
//! and inlined into the query as literal values.

mod cache;
mod free_text;
mod hybrid;
mod store;

pub use cache::ExecutionCache;
pub use free_text::{
    AnswerRequest, FreeTextClient, FreeTextReply, HttpFreeTextClient, SummaryRequest, TextInput,
    TypePrompt,
};
pub use hybrid::{DEFAULT_FREE_TEXT_CONCURRENCY, FreeTextCall, FreeTextFunction, HybridExecutor};
pub use store::{PgStore, QueryResult, RelationalStore, SqlValue};

#[cfg(test)]
pub use store::MockRelationalStore;
