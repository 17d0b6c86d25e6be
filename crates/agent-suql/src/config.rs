//! Agent tunables
//!
//! [`AgentConfig`] holds everything the turn pipeline needs besides its
//! capabilities: the table layout of the store, which columns are answered by
//! the free-text function server, and the model settings of each call site.

use crate::executor::DEFAULT_FREE_TEXT_CONCURRENCY;
use agent_utils::AppConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Default number of rows a generated query may return
pub const DEFAULT_ROW_LIMIT: u32 = 3;

/// Token budget for the results shown to the response model
pub const DEFAULT_TOKEN_BUDGET: usize = 3500;

const DEFAULT_MODEL: &str = "gpt-3.5-turbo-0125";

/// Model settings for one call site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: Option<f32>,
    pub stop: Vec<String>,
}

impl CallSettings {
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            temperature: 0.0,
            top_p: None,
            stop: Vec::new(),
        }
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_stop(mut self, stop: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.stop = stop.into_iter().map(Into::into).collect();
        self
    }
}

/// Where and how generated queries are executed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionTarget {
    /// Table name to its identifier column
    pub table_ids: BTreeMap<String, String>,
    /// Database the queries run against
    pub database: String,
    /// (table, column) pairs answered by the free-text function server
    pub free_text_fields: Vec<(String, String)>,
}

impl ExecutionTarget {
    pub fn id_column(&self, table: &str) -> Option<&str> {
        self.table_ids.get(table).map(String::as_str)
    }

    pub fn is_free_text(&self, table: &str, column: &str) -> bool {
        self.free_text_fields
            .iter()
            .any(|(t, c)| t == table && c == column)
    }
}

impl Default for ExecutionTarget {
    fn default() -> Self {
        Self {
            table_ids: [("etfs", "_id"), ("stocks", "_id")]
                .into_iter()
                .map(|(t, id)| (t.to_string(), id.to_string()))
                .collect(),
            database: "cs224v".to_string(),
            free_text_fields: vec![
                ("etfs".to_string(), "ticker".to_string()),
                ("stocks".to_string(), "ticker".to_string()),
            ],
        }
    }
}

/// Configuration of the conversational agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub target: ExecutionTarget,
    pub row_limit: u32,
    pub token_budget: usize,
    /// Column holding the identifier used for disambiguation
    pub id_field: String,
    /// Column holding the display name used for disambiguation
    pub name_field: String,
    /// Columns never shown to the response model
    pub hidden_fields: Vec<String>,
    pub classifier: CallSettings,
    pub parser: CallSettings,
    pub response: CallSettings,
    pub enable_classifier: bool,
    /// Upper bound for any single capability call
    pub capability_timeout: Duration,
    /// Free-text server calls allowed in flight during one execution
    pub free_text_concurrency: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            target: ExecutionTarget::default(),
            row_limit: DEFAULT_ROW_LIMIT,
            token_budget: DEFAULT_TOKEN_BUDGET,
            id_field: "_id".to_string(),
            name_field: "ticker".to_string(),
            hidden_fields: vec!["_id".to_string(), "id".to_string()],
            classifier: CallSettings::new(DEFAULT_MODEL, 50).with_stop(["\n"]),
            parser: CallSettings::new(DEFAULT_MODEL, 300).with_stop(["Agent:"]),
            response: CallSettings::new(DEFAULT_MODEL, 400).with_top_p(0.5),
            enable_classifier: false,
            capability_timeout: Duration::from_secs(120),
            free_text_concurrency: DEFAULT_FREE_TEXT_CONCURRENCY,
        }
    }
}

impl AgentConfig {
    /// Derive the agent settings from the process configuration
    pub fn from_app_config(app: &AppConfig) -> Self {
        let mut config = Self::default();
        config.classifier.model.clone_from(&app.parser_model);
        config.parser.model.clone_from(&app.parser_model);
        config.response.model.clone_from(&app.response_model);
        config.enable_classifier = app.enable_classifier;
        config.capability_timeout = app.capability_timeout;
        config
    }

    pub fn with_classifier(mut self, enabled: bool) -> Self {
        self.enable_classifier = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stock_schema() {
        let config = AgentConfig::default();
        assert_eq!(config.row_limit, 3);
        assert_eq!(config.token_budget, 3500);
        assert_eq!(config.target.id_column("etfs"), Some("_id"));
        assert_eq!(config.target.id_column("bonds"), None);
        assert!(config.target.is_free_text("stocks", "ticker"));
        assert!(!config.target.is_free_text("stocks", "rsi"));
        assert_eq!(config.parser.stop, vec!["Agent:".to_string()]);
        assert_eq!(config.response.top_p, Some(0.5));
        assert!(!config.enable_classifier);
        assert_eq!(config.free_text_concurrency, 4);
    }

    #[test]
    fn test_from_app_config() {
        let app = AppConfig::builder()
            .openai_api_key("sk-test")
            .parser_model("parser-model")
            .response_model("response-model")
            .enable_classifier(true)
            .capability_timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        let config = AgentConfig::from_app_config(&app);
        assert_eq!(config.parser.model, "parser-model");
        assert_eq!(config.classifier.model, "parser-model");
        assert_eq!(config.response.model, "response-model");
        assert!(config.enable_classifier);
        assert_eq!(config.capability_timeout, Duration::from_secs(5));
    }
}
