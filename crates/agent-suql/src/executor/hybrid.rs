use super::cache::ExecutionCache;
use super::free_text::{FreeTextClient, TextInput};
use super::store::{QueryResult, RelationalStore, SqlValue, quote_literal};
use crate::config::ExecutionTarget;
use crate::error::Result;
use futures::stream::{self, StreamExt};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, instrument};

static ANSWER_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\banswer\s*\(\s*([A-Za-z0-9_]+)\s*,\s*'((?:[^']|'')*)'\s*\)")
        .expect("answer pattern is valid")
});

static SUMMARY_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bsummary\s*\(\s*([A-Za-z0-9_]+)\s*\)").expect("summary pattern is valid")
});

static QUOTED_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'(?:[^']|'')*'").expect("literal pattern is valid"));

static FROM_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bfrom\s+([A-Za-z_][A-Za-z0-9_]*)").expect("from pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FreeTextFunction {
    Answer,
    Summary,
}

impl FreeTextFunction {
    pub fn as_str(self) -> &'static str {
        match self {
            FreeTextFunction::Answer => "answer",
            FreeTextFunction::Summary => "summary",
        }
    }
}

/// A free-text function call found in query text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeTextCall {
    pub function: FreeTextFunction,
    pub column: String,
    pub question: Option<String>,
    /// Byte range of the call in the query
    pub span: Range<usize>,
}

impl FreeTextCall {
    /// Every `answer(...)` and `summary(...)` call, in query order
    ///
    /// Calls written inside a string literal are text, not calls. The
    /// returned spans never overlap.
    pub fn find_all(query: &str) -> Vec<FreeTextCall> {
        let literals: Vec<Range<usize>> = QUOTED_LITERAL.find_iter(query).map(|m| m.range()).collect();
        let in_literal = |pos: usize| literals.iter().any(|r| r.start < pos && pos < r.end);

        let answers = ANSWER_CALL.captures_iter(query).filter_map(|caps| {
            Some(FreeTextCall {
                function: FreeTextFunction::Answer,
                column: caps.get(1)?.as_str().to_string(),
                question: Some(caps.get(2)?.as_str().replace("''", "'")),
                span: caps.get(0)?.range(),
            })
        });
        let summaries = SUMMARY_CALL.captures_iter(query).filter_map(|caps| {
            Some(FreeTextCall {
                function: FreeTextFunction::Summary,
                column: caps.get(1)?.as_str().to_string(),
                question: None,
                span: caps.get(0)?.range(),
            })
        });

        let mut calls: Vec<FreeTextCall> = answers
            .chain(summaries)
            .filter(|c| !in_literal(c.span.start))
            .collect();
        calls.sort_by_key(|c| c.span.start);

        let mut end = 0;
        calls.retain(|c| {
            if c.span.start < end {
                return false;
            }
            end = c.span.end;
            true
        });
        calls
    }
}

/// Table named in the first `FROM` clause
pub(crate) fn from_table(query: &str) -> Option<String> {
    FROM_TABLE
        .captures(query)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Free-text calls in flight at once unless configured otherwise
pub const DEFAULT_FREE_TEXT_CONCURRENCY: usize = 4;

/// Runs queries that mix relational predicates with free-text functions
pub struct HybridExecutor {
    store: Arc<dyn RelationalStore>,
    free_text: Arc<dyn FreeTextClient>,
    concurrency: usize,
}

impl HybridExecutor {
    pub fn new(store: Arc<dyn RelationalStore>, free_text: Arc<dyn FreeTextClient>) -> Self {
        Self {
            store,
            free_text,
            concurrency: DEFAULT_FREE_TEXT_CONCURRENCY,
        }
    }

    /// Bound the number of free-text calls in flight; zero is treated as one
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Execute `query`, reading and extending `cache`
    ///
    /// Free-text results land in `cache` as they arrive, so they are kept
    /// even when a later call or the final statement fails. Timing is left
    /// to the caller.
    #[instrument(skip(self, target, cache), fields(database = %target.database))]
    pub async fn execute(
        &self,
        query: &str,
        target: &ExecutionTarget,
        cache: &mut ExecutionCache,
    ) -> Result<QueryResult> {
        let relational = self.inline_free_text(query, target, cache).await?;
        if relational != query {
            info!("Inlined free-text calls: {}", relational);
        }

        self.store.query(&target.database, &relational).await
    }

    async fn inline_free_text(
        &self,
        query: &str,
        target: &ExecutionTarget,
        cache: &mut ExecutionCache,
    ) -> Result<String> {
        let calls = FreeTextCall::find_all(query);
        if calls.is_empty() {
            return Ok(query.to_string());
        }
        let Some(table) = from_table(query) else {
            return Ok(query.to_string());
        };
        let Some(id_column) = target.id_column(&table) else {
            debug!("No identifier column for {}, leaving free-text calls to the store", table);
            return Ok(query.to_string());
        };

        let mut columns: HashMap<String, QueryResult> = HashMap::new();
        let mut out = String::with_capacity(query.len());
        let mut last = 0;

        for call in calls {
            if !target.is_free_text(&table, &call.column) {
                continue;
            }

            if !columns.contains_key(&call.column) {
                let sql = format!("SELECT {id_column}, {} FROM {table}", call.column);
                let values = self.store.query(&target.database, &sql).await?;
                columns.insert(call.column.clone(), values);
            }
            let values = &columns[&call.column];

            let expr = self.evaluate(&call, id_column, values, cache).await?;
            out.push_str(&query[last..call.span.start]);
            out.push_str(&expr);
            last = call.span.end;
        }
        out.push_str(&query[last..]);
        Ok(out)
    }

    /// One `CASE` expression mapping each row id to the function's result
    ///
    /// Distinct uncached values are sent to the free-text server, at most
    /// `concurrency` at a time.
    async fn evaluate(
        &self,
        call: &FreeTextCall,
        id_column: &str,
        values: &QueryResult,
        cache: &mut ExecutionCache,
    ) -> Result<String> {
        let function = call.function.as_str();
        let question = call.question.as_deref();

        let rows: Vec<(&SqlValue, String, String)> = values
            .rows
            .iter()
            .filter_map(|row| {
                let [id, value] = row.as_slice() else {
                    return None;
                };
                if id.is_null() || value.is_null() {
                    return None;
                }
                let text = value.to_string();
                let argument = ExecutionCache::argument(&text, question);
                Some((id, text, argument))
            })
            .collect();

        let mut seen = HashSet::new();
        let mut pending: Vec<(&str, &str)> = Vec::new();
        for (_, text, argument) in &rows {
            if cache.get(function, argument).is_none() && seen.insert(argument.as_str()) {
                pending.push((argument.as_str(), text.as_str()));
            }
        }
        if !pending.is_empty() {
            debug!("{} {} calls not cached", pending.len(), function);
        }

        let mut fresh = stream::iter(pending)
            .map(|(argument, text)| async move { (argument, self.call_free_text(call, text).await) })
            .buffer_unordered(self.concurrency);
        while let Some((argument, result)) = fresh.next().await {
            cache.insert(function, argument.to_string(), result?);
        }

        let arms: Vec<String> = rows
            .iter()
            .filter_map(|(id, _, argument)| {
                cache.get(function, argument).map(|result| {
                    format!("WHEN {} THEN {}", id.to_sql_literal(), quote_literal(result))
                })
            })
            .collect();

        if arms.is_empty() {
            return Ok("NULL".to_string());
        }
        Ok(format!("CASE {id_column} {} ELSE NULL END", arms.join(" ")))
    }

    async fn call_free_text(&self, call: &FreeTextCall, text: &str) -> Result<String> {
        let input = TextInput::One(text.to_string());
        match (call.function, call.question.as_deref()) {
            (FreeTextFunction::Answer, Some(question)) => {
                self.free_text.answer(input, question, None).await
            }
            _ => self.free_text.summary(input).await,
        }
    }
}
