//! Per-turn control flow
//!
//! ```text
//! AWAITING_INPUT -> CLASSIFYING (optional) -> GENERATING_QUERY -> EXECUTING
//!                -> SHAPING -> SYNTHESIZING_ANSWER -> COMPLETE
//! ```
//!
//! A "no" from the classifier jumps straight to the answer. An empty result
//! set, a failed generation or a failed execution all answer with the
//! no-results template. Nothing inside a turn aborts the session.

use crate::config::AgentConfig;
use crate::dialogue::{DialogueHistory, DialogueTurn, Stage, dialogue_history_to_text};
use crate::error::{Result, SuqlError};
use crate::executor::{HttpFreeTextClient, HybridExecutor, PgStore};
use crate::generate::{GenerationRequest, LlmTextGenerator, TextGenerator};
use crate::postprocess::QueryPostProcessor;
use crate::shaper::ResponseShaper;
use crate::tokens::{HeuristicTokenCounter, TiktokenCounter, TokenCounter};
use agent_llm::providers::{OpenAIConfig, OpenAIProvider};
use agent_prompt::defaults::{ids, load_registry};
use agent_utils::AppConfig;
use serde_json::{Value, json};
use std::iter;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Said when even the no-results answer could not be generated
pub const FALLBACK_UTTERANCE: &str =
    "Sorry, I could not find an answer to that. Could you rephrase your question?";

/// Speaker labels used when the history is rendered for prompts
const USER_LABEL: &str = "User";
const AGENT_LABEL: &str = "Agent";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Query,
    Converse,
    Fallback,
}

/// The conversational agent
pub struct Agent {
    config: AgentConfig,
    generator: Arc<dyn TextGenerator>,
    executor: HybridExecutor,
    post_processor: QueryPostProcessor,
    shaper: ResponseShaper,
}

impl Agent {
    pub fn new(config: AgentConfig, generator: Arc<dyn TextGenerator>, executor: HybridExecutor) -> Self {
        Self::with_token_counter(config, generator, executor, Arc::new(HeuristicTokenCounter))
    }

    pub fn with_token_counter(
        config: AgentConfig,
        generator: Arc<dyn TextGenerator>,
        executor: HybridExecutor,
        counter: Arc<dyn TokenCounter>,
    ) -> Self {
        let post_processor = QueryPostProcessor::new(config.row_limit);
        let shaper = ResponseShaper::new(counter, config.token_budget)
            .with_hidden_fields(config.hidden_fields.clone())
            .with_ned_fields(config.id_field.clone(), config.name_field.clone());
        Self {
            config,
            generator,
            executor,
            post_processor,
            shaper,
        }
    }

    /// Wire the production capabilities from the process configuration
    pub fn from_app_config(app: &AppConfig) -> Result<Self> {
        let provider = OpenAIProvider::with_config(OpenAIConfig::from_app_config(app))?;
        let prompts = load_registry(app.prompt_dir.as_deref())?;
        let generator = LlmTextGenerator::new(Arc::new(provider), Arc::new(prompts), app.capability_timeout);

        let store = PgStore::new(&app.database_url)?;
        let free_text = HttpFreeTextClient::new(app.free_text_server.clone(), app.capability_timeout)?;
        let config = AgentConfig::from_app_config(app);
        let executor = HybridExecutor::new(Arc::new(store), Arc::new(free_text))
            .with_concurrency(config.free_text_concurrency);

        Ok(Self::with_token_counter(
            config,
            Arc::new(generator),
            executor,
            Arc::new(TiktokenCounter::cl100k()?),
        ))
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Process one user utterance and append the finished turn to `history`
    #[instrument(skip(self, history), fields(turn = history.len()))]
    pub async fn compute_next_turn<'h>(
        &self,
        history: &'h mut DialogueHistory,
        user_utterance: &str,
    ) -> &'h DialogueTurn {
        let mut turn = DialogueTurn::new(user_utterance);
        if let Some(previous) = history.last() {
            turn.set_cache(previous.cache().clone());
        }

        let route = if self.config.enable_classifier {
            self.classify(history, &mut turn).await
        } else {
            Route::Query
        };

        let template = match route {
            Route::Query => match self.query_database(history, &mut turn).await {
                Ok(true) => ids::RESPONSE_WITH_RESULTS,
                Ok(false) => ids::RESPONSE_NO_RESULTS,
                Err(e) => {
                    warn!("Query stage failed, answering without results: {}", e);
                    ids::RESPONSE_NO_RESULTS
                }
            },
            Route::Converse => ids::RESPONSE_WITH_RESULTS,
            Route::Fallback => ids::RESPONSE_NO_RESULTS,
        };

        let utterance = self.respond(history, &mut turn, template).await;
        turn.set_agent_utterance(utterance);

        for (stage, secs) in turn.time_statement().iter() {
            info!("{}: {:.3}s", stage, secs);
        }
        history.append(turn)
    }

    async fn classify(&self, history: &DialogueHistory, turn: &mut DialogueTurn) -> Route {
        let request = GenerationRequest::new(
            ids::IF_DB_CLASSIFICATION,
            dialogue_bindings(history, turn),
            &self.config.classifier,
        );

        let started = Instant::now();
        let outcome = self.generator.generate(request).await;
        turn.time_statement_mut()
            .record(Stage::FirstClassification, started.elapsed());

        match outcome {
            Ok(generation) if generation.text.starts_with("Yes") => Route::Query,
            Ok(generation) => {
                info!("Classifier says no database needed: {}", generation.text);
                Route::Converse
            }
            Err(e) => {
                warn!("Classification failed: {}", e);
                Route::Fallback
            }
        }
    }

    /// Generate, repair, execute and shape a query; true when rows remain
    async fn query_database(&self, history: &DialogueHistory, turn: &mut DialogueTurn) -> Result<bool> {
        let mut bindings = dialogue_bindings(history, turn);
        bindings["query"] = Value::String(turn.user_utterance().to_string());
        let request = GenerationRequest::new(ids::PARSER_SUQL, bindings, &self.config.parser);

        let started = Instant::now();
        let generated = self.generator.generate(request).await;
        turn.time_statement_mut()
            .record(Stage::SemanticParser, started.elapsed());
        let generated = generated?.text;
        info!("Generated query: {}", generated);

        let processed = self.post_processor.process(&generated);
        info!("Post-processed query: {}", processed);
        turn.set_targets(generated, processed.clone());

        let mut cache = turn.cache().clone();
        let started = Instant::now();
        let outcome = tokio::time::timeout(
            self.config.capability_timeout,
            self.executor.execute(&processed, &self.config.target, &mut cache),
        )
        .await
        .map_err(|_| SuqlError::Timeout {
            stage: Stage::SuqlExecution.to_string(),
            after: self.config.capability_timeout,
        })
        .and_then(|inner| inner);
        turn.time_statement_mut()
            .record(Stage::SuqlExecution, started.elapsed());
        turn.set_cache(cache);

        let output = match outcome {
            Ok(output) => output,
            Err(e) => {
                warn!("Query execution failed, treating as no results: {}", e);
                turn.set_db_results("[]".to_string());
                return Ok(false);
            }
        };

        let shaped = self.shaper.shape(&output.rows, &output.columns);
        turn.set_db_results(shaped.to_json());
        turn.set_results_for_ned(shaped.ned);
        Ok(!shaped.rows.is_empty())
    }

    async fn respond(&self, history: &DialogueHistory, turn: &mut DialogueTurn, template: &str) -> String {
        let started = Instant::now();
        let outcome = match self.generate_answer(history, turn, template).await {
            Err(e) if template != ids::RESPONSE_NO_RESULTS => {
                warn!("{} failed, retrying with {}: {}", template, ids::RESPONSE_NO_RESULTS, e);
                self.generate_answer(history, turn, ids::RESPONSE_NO_RESULTS)
                    .await
            }
            other => other,
        };
        turn.time_statement_mut()
            .record(Stage::FinalResponse, started.elapsed());

        match outcome {
            Ok(text) => text,
            Err(e) => {
                warn!("Answer generation failed: {}", e);
                FALLBACK_UTTERANCE.to_string()
            }
        }
    }

    async fn generate_answer(
        &self,
        history: &DialogueHistory,
        turn: &DialogueTurn,
        template: &str,
    ) -> Result<String> {
        let request = GenerationRequest::new(template, dialogue_bindings(history, turn), &self.config.response);
        Ok(self.generator.generate(request).await?.text)
    }
}

/// `dlg` and `dlg_text` bindings: the history followed by the current turn
fn dialogue_bindings(history: &DialogueHistory, current: &DialogueTurn) -> Value {
    let turns: Vec<&DialogueTurn> = history.turns().iter().chain(iter::once(current)).collect();
    json!({
        "dlg": turns,
        "dlg_text": dialogue_history_to_text(turns.iter().copied(), USER_LABEL, AGENT_LABEL),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{
        FreeTextClient, QueryResult, RelationalStore, SqlValue, TextInput, TypePrompt,
    };
    use crate::generate::Generation;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replies per template id; a missing id fails the call
    struct ScriptedGenerator {
        replies: HashMap<&'static str, String>,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedGenerator {
        fn new(replies: &[(&'static str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                replies: replies.iter().map(|(k, v)| (*k, (*v).to_string())).collect(),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn templates(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.template_id.clone())
                .collect()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, request: GenerationRequest) -> Result<Generation> {
            let reply = self.replies.get(request.template_id.as_str()).cloned();
            let id = request.template_id.clone();
            self.requests.lock().unwrap().push(request);
            reply
                .map(|text| Generation {
                    text,
                    elapsed: Duration::from_millis(5),
                })
                .ok_or_else(|| SuqlError::Generation(format!("no reply for {id}")))
        }
    }

    /// Serves a fixed result for every statement, or fails
    struct FixedStore {
        result: Option<QueryResult>,
        seen: Mutex<Vec<String>>,
    }

    impl FixedStore {
        fn rows(columns: &[&str], rows: Vec<Vec<SqlValue>>) -> Arc<Self> {
            Arc::new(Self {
                result: Some(QueryResult {
                    columns: columns.iter().map(ToString::to_string).collect(),
                    rows,
                }),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                result: None,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl RelationalStore for FixedStore {
        async fn query(&self, _database: &str, sql: &str) -> Result<QueryResult> {
            self.seen.lock().unwrap().push(sql.to_string());
            let mut result = self
                .result
                .clone()
                .ok_or_else(|| SuqlError::Execution("relation \"etf\" does not exist".into()))?;
            // free-text lookups select just the id and ticker columns
            if sql.starts_with("SELECT _id, ticker FROM") {
                result.columns.truncate(2);
                for row in &mut result.rows {
                    row.truncate(2);
                }
            }
            Ok(result)
        }
    }

    struct CountingFreeText {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl FreeTextClient for CountingFreeText {
        async fn answer(&self, _text: TextInput, _q: &str, _t: Option<TypePrompt>) -> Result<String> {
            *self.calls.lock().unwrap() += 1;
            Ok("Yes".into())
        }

        async fn summary(&self, _text: TextInput) -> Result<String> {
            *self.calls.lock().unwrap() += 1;
            Ok("A fund".into())
        }
    }

    fn free_text() -> Arc<CountingFreeText> {
        Arc::new(CountingFreeText {
            calls: Mutex::new(0),
        })
    }

    fn agent(config: AgentConfig, generator: Arc<ScriptedGenerator>, store: Arc<FixedStore>) -> Agent {
        Agent::new(config, generator, HybridExecutor::new(store, free_text()))
    }

    fn etf_rows() -> Vec<Vec<SqlValue>> {
        vec![
            vec![SqlValue::Int(4), SqlValue::Text("SOXL".into()), SqlValue::Float(14.2)],
            vec![SqlValue::Int(9), SqlValue::Text("TQQQ".into()), SqlValue::Float(11.0)],
        ]
    }

    const ETF_QUERY: &str = "SELECT * FROM etfs WHERE 5_day_return > 10;";

    #[tokio::test]
    async fn test_etf_return_turn() {
        let generator = ScriptedGenerator::new(&[
            (ids::PARSER_SUQL, ETF_QUERY),
            (ids::RESPONSE_WITH_RESULTS, "SOXL and TQQQ returned over 10%."),
        ]);
        let store = FixedStore::rows(&["_id", "ticker", "5_day_return"], etf_rows());
        let agent = agent(AgentConfig::default(), generator.clone(), store.clone());
        let mut history = DialogueHistory::new();

        let turn = agent
            .compute_next_turn(&mut history, "Show me ETFs with 5 day return above 10.")
            .await;

        assert_eq!(turn.user_target(), Some(ETF_QUERY));
        let executed = turn.temp_target().unwrap();
        assert!(executed.contains("CAST(5_day_return AS NUMERIC) > 10"));
        assert!(executed.contains("LIMIT 3"));
        assert_eq!(store.seen.lock().unwrap().as_slice(), [executed.to_string()]);

        assert_eq!(turn.agent_utterance(), Some("SOXL and TQQQ returned over 10%."));
        assert!(!turn.db_results().unwrap().contains("_id"));
        assert_eq!(turn.results_for_ned().len(), 2);

        let stats = turn.time_statement();
        assert!(!stats.contains(Stage::FirstClassification));
        assert!(stats.contains(Stage::SemanticParser));
        assert!(stats.contains(Stage::SuqlExecution));
        assert!(stats.contains(Stage::FinalResponse));

        assert_eq!(
            generator.templates(),
            vec![ids::PARSER_SUQL.to_string(), ids::RESPONSE_WITH_RESULTS.to_string()]
        );
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_parser_sees_history_and_query() {
        let generator = ScriptedGenerator::new(&[
            (ids::PARSER_SUQL, ETF_QUERY),
            (ids::RESPONSE_WITH_RESULTS, "ok"),
        ]);
        let store = FixedStore::rows(&["_id", "ticker", "5_day_return"], etf_rows());
        let agent = agent(AgentConfig::default(), generator.clone(), store);
        let mut history = DialogueHistory::new();

        agent.compute_next_turn(&mut history, "first").await;
        agent.compute_next_turn(&mut history, "tell me about the second one").await;

        let requests = generator.requests.lock().unwrap();
        let parser = &requests[2];
        assert_eq!(parser.template_id, ids::PARSER_SUQL);
        assert_eq!(parser.bindings["query"], "tell me about the second one");
        assert_eq!(parser.bindings["dlg"].as_array().unwrap().len(), 2);
        assert_eq!(parser.bindings["dlg"][0]["results_for_ned"][1]["ticker"], "TQQQ");
        assert!(
            parser.bindings["dlg_text"]
                .as_str()
                .unwrap()
                .starts_with("User: first\n[Database returns")
        );
        assert_eq!(parser.temperature, 0.0);
        assert_eq!(parser.stop_sequences, vec!["Agent:".to_string()]);
        assert_eq!(history.len(), 2);
        assert_eq!(history.turns()[0].user_utterance(), "first");
    }

    #[tokio::test]
    async fn test_empty_results_use_no_results_template() {
        let generator = ScriptedGenerator::new(&[
            (ids::PARSER_SUQL, ETF_QUERY),
            (ids::RESPONSE_NO_RESULTS, "I found nothing."),
        ]);
        let store = FixedStore::rows(&["_id", "ticker"], Vec::new());
        let agent = agent(AgentConfig::default(), generator.clone(), store);
        let mut history = DialogueHistory::new();

        let turn = agent.compute_next_turn(&mut history, "ETFs up 900%").await;

        assert_eq!(turn.agent_utterance(), Some("I found nothing."));
        assert_eq!(turn.db_results(), Some("[]"));
        assert!(turn.time_statement().contains(Stage::FinalResponse));
        assert_eq!(generator.templates()[1], ids::RESPONSE_NO_RESULTS);
    }

    #[tokio::test]
    async fn test_execution_failure_degrades_to_no_results() {
        let generator = ScriptedGenerator::new(&[
            (ids::PARSER_SUQL, "SELECT * FROM etf;"),
            (ids::RESPONSE_NO_RESULTS, "Nothing matched."),
        ]);
        let agent = agent(AgentConfig::default(), generator.clone(), FixedStore::failing());
        let mut history = DialogueHistory::new();

        let turn = agent.compute_next_turn(&mut history, "etfs").await;

        assert_eq!(turn.agent_utterance(), Some("Nothing matched."));
        assert_eq!(turn.db_results(), Some("[]"));
        assert!(turn.time_statement().contains(Stage::SuqlExecution));
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_parser_failure_skips_execution() {
        let generator = ScriptedGenerator::new(&[(ids::RESPONSE_NO_RESULTS, "Could you rephrase?")]);
        let store = FixedStore::rows(&["ticker"], Vec::new());
        let agent = agent(AgentConfig::default(), generator, store.clone());
        let mut history = DialogueHistory::new();

        let turn = agent.compute_next_turn(&mut history, "???").await;

        assert_eq!(turn.agent_utterance(), Some("Could you rephrase?"));
        assert!(turn.user_target().is_none());
        assert!(turn.db_results().is_none());
        assert!(turn.time_statement().contains(Stage::SemanticParser));
        assert!(!turn.time_statement().contains(Stage::SuqlExecution));
        assert!(store.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_classifier_disabled_always_queries() {
        let generator = ScriptedGenerator::new(&[
            (ids::IF_DB_CLASSIFICATION, "No"),
            (ids::PARSER_SUQL, ETF_QUERY),
            (ids::RESPONSE_WITH_RESULTS, "ok"),
        ]);
        let store = FixedStore::rows(&["_id", "ticker", "5_day_return"], etf_rows());
        let agent = agent(AgentConfig::default().with_classifier(false), generator.clone(), store);
        let mut history = DialogueHistory::new();

        agent.compute_next_turn(&mut history, "hello").await;

        assert!(!generator.templates().contains(&ids::IF_DB_CLASSIFICATION.to_string()));
        assert_eq!(generator.templates()[0], ids::PARSER_SUQL);
    }

    #[tokio::test]
    async fn test_classifier_no_answers_conversationally() {
        let generator = ScriptedGenerator::new(&[
            (ids::IF_DB_CLASSIFICATION, "No"),
            (ids::RESPONSE_WITH_RESULTS, "Hello! Ask me about stocks."),
        ]);
        let store = FixedStore::rows(&["ticker"], Vec::new());
        let agent = agent(AgentConfig::default().with_classifier(true), generator.clone(), store.clone());
        let mut history = DialogueHistory::new();

        let turn = agent.compute_next_turn(&mut history, "hi there").await;

        assert_eq!(turn.agent_utterance(), Some("Hello! Ask me about stocks."));
        assert!(turn.db_results().is_none());
        let stages: Vec<Stage> = turn.time_statement().iter().map(|(s, _)| s).collect();
        assert_eq!(stages, vec![Stage::FirstClassification, Stage::FinalResponse]);
        assert!(store.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_classifier_yes_prefix_queries() {
        let generator = ScriptedGenerator::new(&[
            (ids::IF_DB_CLASSIFICATION, "Yes, the user asks for data"),
            (ids::PARSER_SUQL, ETF_QUERY),
            (ids::RESPONSE_WITH_RESULTS, "ok"),
        ]);
        let store = FixedStore::rows(&["_id", "ticker", "5_day_return"], etf_rows());
        let agent = agent(AgentConfig::default().with_classifier(true), generator.clone(), store);
        let mut history = DialogueHistory::new();

        let turn = agent.compute_next_turn(&mut history, "top etfs").await;

        assert_eq!(turn.time_statement().len(), 4);
        assert_eq!(
            generator.templates(),
            vec![
                ids::IF_DB_CLASSIFICATION.to_string(),
                ids::PARSER_SUQL.to_string(),
                ids::RESPONSE_WITH_RESULTS.to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_answer_failure_falls_back() {
        let generator = ScriptedGenerator::new(&[(ids::PARSER_SUQL, ETF_QUERY)]);
        let store = FixedStore::rows(&["_id", "ticker", "5_day_return"], etf_rows());
        let agent = agent(AgentConfig::default(), generator.clone(), store);
        let mut history = DialogueHistory::new();

        let turn = agent.compute_next_turn(&mut history, "etfs").await;

        assert_eq!(turn.agent_utterance(), Some(FALLBACK_UTTERANCE));
        assert_eq!(
            generator.templates()[1..],
            [ids::RESPONSE_WITH_RESULTS.to_string(), ids::RESPONSE_NO_RESULTS.to_string()]
        );
    }

    #[tokio::test]
    async fn test_cache_carried_across_turns() {
        let query = "SELECT * FROM etfs WHERE answer(ticker, 'Is it leveraged?') = 'Yes';";
        let generator = ScriptedGenerator::new(&[
            (ids::PARSER_SUQL, query),
            (ids::RESPONSE_WITH_RESULTS, "ok"),
        ]);
        let store = FixedStore::rows(&["_id", "ticker", "5_day_return"], etf_rows());
        let counter = free_text();
        let agent = Agent::new(
            AgentConfig::default(),
            generator,
            HybridExecutor::new(store, counter.clone()),
        );
        let mut history = DialogueHistory::new();

        agent.compute_next_turn(&mut history, "leveraged etfs?").await;
        assert_eq!(*counter.calls.lock().unwrap(), 2);

        let turn = agent.compute_next_turn(&mut history, "leveraged etfs again?").await;
        assert_eq!(*counter.calls.lock().unwrap(), 2);
        assert_eq!(turn.cache().len(), 2);
    }

    #[tokio::test]
    async fn test_classifier_failure_answers_without_query() {
        let generator = ScriptedGenerator::new(&[
            (ids::PARSER_SUQL, ETF_QUERY),
            (ids::RESPONSE_NO_RESULTS, "Could you say that differently?"),
        ]);
        let store = FixedStore::rows(&["_id", "ticker", "5_day_return"], etf_rows());
        let agent = agent(AgentConfig::default().with_classifier(true), generator.clone(), store.clone());
        let mut history = DialogueHistory::new();

        let turn = agent.compute_next_turn(&mut history, "top etfs").await;

        assert_eq!(turn.agent_utterance(), Some("Could you say that differently?"));
        assert!(turn.db_results().is_none());
        assert_eq!(
            generator.templates(),
            vec![
                ids::IF_DB_CLASSIFICATION.to_string(),
                ids::RESPONSE_NO_RESULTS.to_string()
            ]
        );
        let stages: Vec<Stage> = turn.time_statement().iter().map(|(s, _)| s).collect();
        assert_eq!(stages, vec![Stage::FirstClassification, Stage::FinalResponse]);
        assert!(store.seen.lock().unwrap().is_empty());
    }

    /// Answers free-text lookups, never finishes the final statement
    struct HangingStore;

    #[async_trait]
    impl RelationalStore for HangingStore {
        async fn query(&self, _database: &str, sql: &str) -> Result<QueryResult> {
            if sql.starts_with("SELECT _id, ticker FROM") {
                return Ok(QueryResult {
                    columns: vec!["_id".into(), "ticker".into()],
                    rows: vec![
                        vec![SqlValue::Int(4), SqlValue::Text("SOXL".into())],
                        vec![SqlValue::Int(9), SqlValue::Text("TQQQ".into())],
                    ],
                });
            }
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_execution_timeout_degrades_to_no_results() {
        let query = "SELECT * FROM etfs WHERE answer(ticker, 'Is it leveraged?') = 'Yes';";
        let generator = ScriptedGenerator::new(&[
            (ids::PARSER_SUQL, query),
            (ids::RESPONSE_NO_RESULTS, "The database took too long."),
        ]);
        let config = AgentConfig {
            capability_timeout: Duration::from_secs(2),
            ..AgentConfig::default()
        };
        let agent = Agent::new(
            config,
            generator.clone(),
            HybridExecutor::new(Arc::new(HangingStore), free_text()),
        );
        let mut history = DialogueHistory::new();

        let turn = agent.compute_next_turn(&mut history, "leveraged etfs?").await;

        assert_eq!(turn.agent_utterance(), Some("The database took too long."));
        assert_eq!(turn.db_results(), Some("[]"));
        assert!(turn.time_statement().contains(Stage::SuqlExecution));
        assert!(turn.time_statement().contains(Stage::FinalResponse));
        assert_eq!(generator.templates()[1], ids::RESPONSE_NO_RESULTS);
        // answers gathered before the timeout are kept for the next turn
        assert_eq!(turn.cache().len(), 2);
        assert_eq!(history.len(), 1);
    }
}
