//! Process configuration
//!
//! [`AppConfig`] is created once at startup and shared read-only afterwards
//! (usually behind an `Arc`). It can be assembled three ways:
//!
//! - [`AppConfig::builder`] for programmatic setup (tests, embedding)
//! - [`AppConfig::from_env`] reading `OPENAI_API_KEY` and friends, after loading `.env`
//! - [`AppConfig::from_toml_file`] for a TOML file, with the credential still
//!   taken from the environment when the file does not carry one

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_PARSER_MODEL: &str = "gpt-3.5-turbo-0125";
const DEFAULT_RESPONSE_MODEL: &str = "gpt-3.5-turbo-0125";
const DEFAULT_FREE_TEXT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_PLAN_MODEL: &str = "gpt-4o";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_DATABASE_URL: &str = "postgres://localhost/cs224v";
const DEFAULT_FREE_TEXT_SERVER: &str = "http://127.0.0.1:8501";
const DEFAULT_CAPABILITY_TIMEOUT_SECS: u64 = 120;

/// Configuration errors. A missing credential is fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The text-generation API key is not available
    #[error("missing credential: {0} is not set")]
    MissingCredential(&'static str),

    /// A value failed validation
    #[error("invalid configuration value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// Config file could not be read
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("failed to parse config file '{path}': {detail}")]
    Parse { path: String, detail: String },
}

/// Result alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Process-wide, read-only configuration
#[derive(Clone)]
pub struct AppConfig {
    /// API key for the text-generation service
    pub openai_api_key: String,
    /// Base URL of the OpenAI-compatible API
    pub openai_api_base: String,
    /// Model used to generate hybrid queries and classify turns
    pub parser_model: String,
    /// Model used to synthesize the final answer
    pub response_model: String,
    /// Model used by the free-text function server
    pub free_text_model: String,
    /// Model used by the investment plan generator
    pub plan_model: String,
    /// Embedding model used for similarity ranking
    pub embedding_model: String,
    /// Postgres connection string for the stock/ETF store
    pub database_url: String,
    /// Address of the free-text function server
    pub free_text_server: Url,
    /// Directory with `*.prompt` files overriding the built-in templates
    pub prompt_dir: Option<PathBuf>,
    /// Upper bound on any single capability call
    pub capability_timeout: Duration,
    /// Whether the relevance classifier runs before query generation
    pub enable_classifier: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("openai_api_key", &"<redacted>")
            .field("openai_api_base", &self.openai_api_base)
            .field("parser_model", &self.parser_model)
            .field("response_model", &self.response_model)
            .field("free_text_model", &self.free_text_model)
            .field("plan_model", &self.plan_model)
            .field("embedding_model", &self.embedding_model)
            .field("database_url", &self.database_url)
            .field("free_text_server", &self.free_text_server.as_str())
            .field("prompt_dir", &self.prompt_dir)
            .field("capability_timeout", &self.capability_timeout)
            .field("enable_classifier", &self.enable_classifier)
            .finish()
    }
}

impl AppConfig {
    /// Create a new configuration builder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load from the process environment, reading `.env` first if present
    ///
    /// Recognized variables: `OPENAI_API_KEY` (required), `OPENAI_API_BASE`,
    /// `PARSER_MODEL`, `RESPONSE_MODEL`, `FREE_TEXT_MODEL`, `PLAN_MODEL`,
    /// `EMBEDDING_MODEL`, `DATABASE_URL`, `FREE_TEXT_SERVER`, `PROMPT_DIR`,
    /// `CAPABILITY_TIMEOUT_SECS`, `ENABLE_CLASSIFIER`.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();

        if let Some(key) = lookup("OPENAI_API_KEY") {
            builder = builder.openai_api_key(key);
        }
        if let Some(base) = lookup("OPENAI_API_BASE") {
            builder = builder.openai_api_base(base);
        }
        if let Some(model) = lookup("PARSER_MODEL") {
            builder = builder.parser_model(model);
        }
        if let Some(model) = lookup("RESPONSE_MODEL") {
            builder = builder.response_model(model);
        }
        if let Some(model) = lookup("FREE_TEXT_MODEL") {
            builder = builder.free_text_model(model);
        }
        if let Some(model) = lookup("PLAN_MODEL") {
            builder = builder.plan_model(model);
        }
        if let Some(model) = lookup("EMBEDDING_MODEL") {
            builder = builder.embedding_model(model);
        }
        if let Some(url) = lookup("DATABASE_URL") {
            builder = builder.database_url(url);
        }
        if let Some(addr) = lookup("FREE_TEXT_SERVER") {
            builder = builder.free_text_server(addr);
        }
        if let Some(dir) = lookup("PROMPT_DIR") {
            builder = builder.prompt_dir(dir);
        }
        if let Some(secs) = lookup("CAPABILITY_TIMEOUT_SECS") {
            let secs = secs.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                field: "CAPABILITY_TIMEOUT_SECS",
                reason: e.to_string(),
            })?;
            builder = builder.capability_timeout(Duration::from_secs(secs));
        }
        if let Some(flag) = lookup("ENABLE_CLASSIFIER") {
            builder = builder.enable_classifier(parse_flag(&flag));
        }

        builder.build()
    }

    /// Load from a TOML file
    ///
    /// The credential may be omitted from the file, in which case
    /// `OPENAI_API_KEY` from the environment is used.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let _ = dotenvy::dotenv();
        Self::from_toml_str(&raw, path, |key| std::env::var(key).ok())
    }

    fn from_toml_str<F>(raw: &str, path: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file: FileConfig = toml::from_str(raw).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;

        let mut builder = Self::builder();
        if let Some(key) = file.openai_api_key.or_else(|| lookup("OPENAI_API_KEY")) {
            builder = builder.openai_api_key(key);
        }
        if let Some(base) = file.openai_api_base {
            builder = builder.openai_api_base(base);
        }
        if let Some(model) = file.parser_model {
            builder = builder.parser_model(model);
        }
        if let Some(model) = file.response_model {
            builder = builder.response_model(model);
        }
        if let Some(model) = file.free_text_model {
            builder = builder.free_text_model(model);
        }
        if let Some(model) = file.plan_model {
            builder = builder.plan_model(model);
        }
        if let Some(model) = file.embedding_model {
            builder = builder.embedding_model(model);
        }
        if let Some(url) = file.database_url {
            builder = builder.database_url(url);
        }
        if let Some(addr) = file.free_text_server {
            builder = builder.free_text_server(addr);
        }
        if let Some(dir) = file.prompt_dir {
            builder = builder.prompt_dir(dir);
        }
        if let Some(secs) = file.capability_timeout_secs {
            builder = builder.capability_timeout(Duration::from_secs(secs));
        }
        if let Some(flag) = file.enable_classifier {
            builder = builder.enable_classifier(flag);
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.openai_api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential("OPENAI_API_KEY"));
        }

        if self.capability_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                field: "capability_timeout",
                reason: "must be greater than zero".to_string(),
            });
        }

        if !matches!(self.free_text_server.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                field: "free_text_server",
                reason: format!("unsupported scheme '{}'", self.free_text_server.scheme()),
            });
        }

        Ok(())
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    openai_api_key: Option<String>,
    openai_api_base: Option<String>,
    parser_model: Option<String>,
    response_model: Option<String>,
    free_text_model: Option<String>,
    plan_model: Option<String>,
    embedding_model: Option<String>,
    database_url: Option<String>,
    free_text_server: Option<String>,
    prompt_dir: Option<PathBuf>,
    capability_timeout_secs: Option<u64>,
    enable_classifier: Option<bool>,
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    openai_api_key: Option<String>,
    openai_api_base: Option<String>,
    parser_model: Option<String>,
    response_model: Option<String>,
    free_text_model: Option<String>,
    plan_model: Option<String>,
    embedding_model: Option<String>,
    database_url: Option<String>,
    free_text_server: Option<String>,
    prompt_dir: Option<PathBuf>,
    capability_timeout: Option<Duration>,
    enable_classifier: Option<bool>,
}

impl AppConfigBuilder {
    /// Set the API key
    pub fn openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    /// Set the API base URL
    pub fn openai_api_base(mut self, base: impl Into<String>) -> Self {
        self.openai_api_base = Some(base.into());
        self
    }

    /// Set the query-generation model
    pub fn parser_model(mut self, model: impl Into<String>) -> Self {
        self.parser_model = Some(model.into());
        self
    }

    /// Set the answer-synthesis model
    pub fn response_model(mut self, model: impl Into<String>) -> Self {
        self.response_model = Some(model.into());
        self
    }

    /// Set the free-text server model
    pub fn free_text_model(mut self, model: impl Into<String>) -> Self {
        self.free_text_model = Some(model.into());
        self
    }

    /// Set the plan generator model
    pub fn plan_model(mut self, model: impl Into<String>) -> Self {
        self.plan_model = Some(model.into());
        self
    }

    /// Set the embedding model
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = Some(model.into());
        self
    }

    /// Set the database URL
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Set the free-text server address
    pub fn free_text_server(mut self, address: impl Into<String>) -> Self {
        self.free_text_server = Some(address.into());
        self
    }

    /// Set the prompt override directory
    pub fn prompt_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_dir = Some(dir.into());
        self
    }

    /// Set the capability call timeout
    pub fn capability_timeout(mut self, timeout: Duration) -> Self {
        self.capability_timeout = Some(timeout);
        self
    }

    /// Enable or disable the relevance classifier
    pub fn enable_classifier(mut self, enabled: bool) -> Self {
        self.enable_classifier = Some(enabled);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AppConfig> {
        let server = self
            .free_text_server
            .unwrap_or_else(|| DEFAULT_FREE_TEXT_SERVER.to_string());
        let free_text_server = Url::parse(&server).map_err(|e| ConfigError::Invalid {
            field: "free_text_server",
            reason: format!("'{server}': {e}"),
        })?;

        let config = AppConfig {
            openai_api_key: self
                .openai_api_key
                .ok_or(ConfigError::MissingCredential("OPENAI_API_KEY"))?,
            openai_api_base: self
                .openai_api_base
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            parser_model: self
                .parser_model
                .unwrap_or_else(|| DEFAULT_PARSER_MODEL.to_string()),
            response_model: self
                .response_model
                .unwrap_or_else(|| DEFAULT_RESPONSE_MODEL.to_string()),
            free_text_model: self
                .free_text_model
                .unwrap_or_else(|| DEFAULT_FREE_TEXT_MODEL.to_string()),
            plan_model: self
                .plan_model
                .unwrap_or_else(|| DEFAULT_PLAN_MODEL.to_string()),
            embedding_model: self
                .embedding_model
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            database_url: self
                .database_url
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            free_text_server,
            prompt_dir: self.prompt_dir,
            capability_timeout: self
                .capability_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_CAPABILITY_TIMEOUT_SECS)),
            enable_classifier: self.enable_classifier.unwrap_or(false),
        };

        config.validate()?;
        Ok(config)
    }
}
