//! Dialogue turns and history

use crate::executor::ExecutionCache;
use crate::shaper::NedEntry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// A timed pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    FirstClassification,
    SemanticParser,
    SuqlExecution,
    FinalResponse,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::FirstClassification => "first_classification",
            Stage::SemanticParser => "semantic_parser",
            Stage::SuqlExecution => "suql_execution",
            Stage::FinalResponse => "final_response",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Elapsed seconds per stage, only for stages that ran
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeStatement(BTreeMap<Stage, f64>);

impl TimeStatement {
    pub fn record(&mut self, stage: Stage, elapsed: Duration) {
        self.0.insert(stage, elapsed.as_secs_f64());
    }

    pub fn get(&self, stage: Stage) -> Option<f64> {
        self.0.get(&stage).copied()
    }

    pub fn contains(&self, stage: Stage) -> bool {
        self.0.contains_key(&stage)
    }

    /// Entries in pipeline order
    pub fn iter(&self) -> impl Iterator<Item = (Stage, f64)> + '_ {
        self.0.iter().map(|(stage, secs)| (*stage, *secs))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One exchange in the conversation
///
/// The user utterance is fixed at creation. The remaining fields are filled
/// by the orchestrator in pipeline order and frozen once the turn is
/// appended to a [`DialogueHistory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueTurn {
    user_utterance: String,
    agent_utterance: Option<String>,
    db_results: Option<String>,
    user_target: Option<String>,
    temp_target: Option<String>,
    results_for_ned: Vec<NedEntry>,
    time_statement: TimeStatement,
    cache: ExecutionCache,
}

impl DialogueTurn {
    pub fn new(user_utterance: impl Into<String>) -> Self {
        Self {
            user_utterance: user_utterance.into(),
            agent_utterance: None,
            db_results: None,
            user_target: None,
            temp_target: None,
            results_for_ned: Vec::new(),
            time_statement: TimeStatement::default(),
            cache: ExecutionCache::default(),
        }
    }

    pub fn user_utterance(&self) -> &str {
        &self.user_utterance
    }

    pub fn agent_utterance(&self) -> Option<&str> {
        self.agent_utterance.as_deref()
    }

    /// Shaped query results as pretty JSON, if a query ran
    pub fn db_results(&self) -> Option<&str> {
        self.db_results.as_deref()
    }

    /// Query text as generated by the parser
    pub fn user_target(&self) -> Option<&str> {
        self.user_target.as_deref()
    }

    /// Query text after post-processing, as executed
    pub fn temp_target(&self) -> Option<&str> {
        self.temp_target.as_deref()
    }

    pub fn results_for_ned(&self) -> &[NedEntry] {
        &self.results_for_ned
    }

    pub fn time_statement(&self) -> &TimeStatement {
        &self.time_statement
    }

    pub fn cache(&self) -> &ExecutionCache {
        &self.cache
    }

    pub(crate) fn set_agent_utterance(&mut self, utterance: String) {
        self.agent_utterance = Some(utterance);
    }

    pub(crate) fn set_db_results(&mut self, results: String) {
        self.db_results = Some(results);
    }

    pub(crate) fn set_targets(&mut self, generated: String, executed: String) {
        self.user_target = Some(generated);
        self.temp_target = Some(executed);
    }

    pub(crate) fn set_results_for_ned(&mut self, entries: Vec<NedEntry>) {
        self.results_for_ned = entries;
    }

    pub(crate) fn time_statement_mut(&mut self) -> &mut TimeStatement {
        &mut self.time_statement
    }

    pub(crate) fn set_cache(&mut self, cache: ExecutionCache) {
        self.cache = cache;
    }

    /// Render as transcript lines
    ///
    /// ```
    /// use agent_suql::DialogueTurn;
    ///
    /// let turn = DialogueTurn::new("hi");
    /// assert_eq!(turn.to_text("User", "Agent"), "User: hi");
    /// ```
    pub fn to_text(&self, they: &str, you: &str) -> String {
        let mut text = format!("{they}: {}", self.user_utterance);
        if let Some(results) = &self.db_results {
            text.push_str(&format!("\n[Database returns \"{results}\"]"));
        }
        if let Some(utterance) = &self.agent_utterance {
            text.push_str(&format!("\n{you}: {utterance}"));
        }
        text
    }
}

/// Render turns one after another, separated by newlines
pub fn dialogue_history_to_text<'a>(
    turns: impl IntoIterator<Item = &'a DialogueTurn>,
    they: &str,
    you: &str,
) -> String {
    turns
        .into_iter()
        .map(|turn| turn.to_text(they, you))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Append-only conversation history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogueHistory {
    turns: Vec<DialogueTurn>,
}

impl DialogueHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[DialogueTurn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&DialogueTurn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn to_text(&self, they: &str, you: &str) -> String {
        dialogue_history_to_text(&self.turns, they, you)
    }

    pub(crate) fn append(&mut self, turn: DialogueTurn) -> &DialogueTurn {
        self.turns.push(turn);
        &self.turns[self.turns.len() - 1]
    }
}
