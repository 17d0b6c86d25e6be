//! The `answer` and `summary` free-text functions

use crate::config::ServerConfig;
use crate::error::Result;
use crate::ranking::SimilarityRanker;
use agent_prompt::defaults::ids;
use agent_suql::executor::{TextInput, TypePrompt};
use agent_suql::{CallSettings, GenerationRequest, TextGenerator, TokenCounter};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Reply for empty input
pub const NO_INFORMATION: &str = "no information";

const SUMMARY_QUESTION: &str = "What is the summary of this data?";

pub struct FreeTextEngine {
    generator: Arc<dyn TextGenerator>,
    ranker: Arc<dyn SimilarityRanker>,
    counter: Arc<dyn TokenCounter>,
    config: ServerConfig,
}

impl FreeTextEngine {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        ranker: Arc<dyn SimilarityRanker>,
        counter: Arc<dyn TokenCounter>,
        config: ServerConfig,
    ) -> Self {
        Self {
            generator,
            ranker,
            counter,
            config,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Answer `question` from the text; lists are ranked and cut to budget
    #[instrument(skip(self, text))]
    pub async fn answer(
        &self,
        text: TextInput,
        question: &str,
        type_prompt: Option<TypePrompt>,
    ) -> Result<String> {
        if text.is_empty() {
            return Ok(NO_INFORMATION.to_string());
        }

        let data = match text {
            TextInput::One(doc) => vec![doc],
            TextInput::Many(docs) => {
                let ranked = self.ranker.rank(question, &docs, self.config.k).await?;
                self.fit_to_budget(ranked)
            }
        };

        let bindings = json!({
            "data": data,
            "question": question,
            "type_prompt": type_prompt.map_or("", TypePrompt::instruction),
        });
        let settings = CallSettings::new(self.config.engine.clone(), 1000);
        let generation = self
            .generator
            .generate(GenerationRequest::new(ids::ANSWER_QA, bindings, &settings))
            .await?;
        Ok(generation.text)
    }

    /// Summarise the text; lists are cut to budget without ranking
    #[instrument(skip(self, text))]
    pub async fn summary(&self, text: TextInput) -> Result<String> {
        if text.is_empty() {
            return Ok(NO_INFORMATION.to_string());
        }

        let data = match text {
            TextInput::One(doc) => vec![doc],
            TextInput::Many(docs) => self.fit_to_budget(docs),
        };

        let bindings = json!({
            "data": data,
            "question": SUMMARY_QUESTION,
            "type_prompt": "",
        });
        let settings = CallSettings::new(self.config.engine.clone(), 200).with_stop(["\n"]);
        let generation = self
            .generator
            .generate(GenerationRequest::new(ids::ANSWER_QA, bindings, &settings))
            .await?;
        Ok(generation.text)
    }

    /// Leading documents whose newline-joined text stays under the token ceiling
    pub fn fit_to_budget(&self, documents: Vec<String>) -> Vec<String> {
        let mut kept: Vec<String> = Vec::new();
        for doc in documents {
            kept.push(doc);
            if self.counter.count(&kept.join("\n")) >= self.config.max_input_tokens {
                kept.pop();
                break;
            }
        }
        debug!(kept = kept.len(), "Documents within budget");
        kept
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use agent_suql::{Generation, HeuristicTokenCounter, SuqlError};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replies with a fixed text and records every request
    pub(crate) struct RecordingGenerator {
        pub(crate) reply: String,
        pub(crate) requests: Mutex<Vec<GenerationRequest>>,
    }

    impl RecordingGenerator {
        pub(crate) fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for RecordingGenerator {
        async fn generate(&self, request: GenerationRequest) -> agent_suql::Result<Generation> {
            self.requests.lock().unwrap().push(request);
            if self.reply.is_empty() {
                return Err(SuqlError::Generation("empty".into()));
            }
            Ok(Generation {
                text: self.reply.clone(),
                elapsed: Duration::from_millis(1),
            })
        }
    }

    /// Ranks documents in reverse input order
    pub(crate) struct ReverseRanker;

    #[async_trait]
    impl SimilarityRanker for ReverseRanker {
        async fn rank(&self, _query: &str, documents: &[String], top_k: usize) -> Result<Vec<String>> {
            Ok(documents.iter().rev().take(top_k).cloned().collect())
        }
    }

    pub(crate) fn engine(generator: Arc<RecordingGenerator>, config: ServerConfig) -> FreeTextEngine {
        FreeTextEngine::new(generator, Arc::new(ReverseRanker), Arc::new(HeuristicTokenCounter), config)
    }

    #[tokio::test]
    async fn test_empty_text_skips_model() {
        let generator = RecordingGenerator::new("x");
        let engine = engine(generator.clone(), ServerConfig::default());

        assert_eq!(engine.answer("".into(), "q", None).await.unwrap(), NO_INFORMATION);
        assert_eq!(engine.summary(Vec::new().into()).await.unwrap(), NO_INFORMATION);
        assert!(generator.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_answer_single_document() {
        let generator = RecordingGenerator::new("42");
        let engine = engine(generator.clone(), ServerConfig::default());

        let result = engine
            .answer("QQQ tracks the Nasdaq-100".into(), "What does it track?", Some(TypePrompt::Numeric))
            .await
            .unwrap();
        assert_eq!(result, "42");

        let requests = generator.requests.lock().unwrap();
        let request = &requests[0];
        assert_eq!(request.template_id, ids::ANSWER_QA);
        assert_eq!(request.bindings["data"], json!(["QQQ tracks the Nasdaq-100"]));
        assert_eq!(request.bindings["type_prompt"], " Output the result as a numeric value.");
        assert_eq!(request.max_output_tokens, 1000);
        assert_eq!(request.model_id, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_answer_list_is_ranked_and_limited_to_k() {
        let generator = RecordingGenerator::new("ok");
        let config = ServerConfig {
            k: 2,
            ..ServerConfig::default()
        };
        let engine = engine(generator.clone(), config);
        let docs: Vec<String> = ["a", "b", "c"].iter().map(ToString::to_string).collect();

        engine.answer(docs.into(), "q", None).await.unwrap();

        let requests = generator.requests.lock().unwrap();
        assert_eq!(requests[0].bindings["data"], json!(["c", "b"]));
        assert_eq!(requests[0].bindings["type_prompt"], "");
    }

    #[tokio::test]
    async fn test_summary_settings() {
        let generator = RecordingGenerator::new("A tech fund.");
        let engine = engine(generator.clone(), ServerConfig::default());

        engine.summary("long text".into()).await.unwrap();

        let requests = generator.requests.lock().unwrap();
        assert_eq!(requests[0].bindings["question"], SUMMARY_QUESTION);
        assert_eq!(requests[0].max_output_tokens, 200);
        assert_eq!(requests[0].stop_sequences, vec!["\n".to_string()]);
    }

    #[test]
    fn test_fit_to_budget_is_strictly_below_ceiling() {
        let config = ServerConfig {
            max_input_tokens: 3,
            ..ServerConfig::default()
        };
        let engine = engine(RecordingGenerator::new("x"), config);
        // "aaaa" is one token, "aaaa\nbbbb" is three
        let docs = vec!["aaaa".to_string(), "bbbb".to_string(), "cc".to_string()];
        assert_eq!(engine.fit_to_budget(docs), vec!["aaaa".to_string()]);
    }
}
