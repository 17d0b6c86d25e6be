//! Client side of the free-text function server

use crate::error::{Result, SuqlError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// One document or a list of documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextInput {
    One(String),
    Many(Vec<String>),
}

impl TextInput {
    /// True for an empty string or an empty list
    pub fn is_empty(&self) -> bool {
        match self {
            TextInput::One(s) => s.is_empty(),
            TextInput::Many(v) => v.is_empty(),
        }
    }
}

impl From<&str> for TextInput {
    fn from(s: &str) -> Self {
        TextInput::One(s.to_string())
    }
}

impl From<Vec<String>> for TextInput {
    fn from(v: Vec<String>) -> Self {
        TextInput::Many(v)
    }
}

/// Expected shape of an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypePrompt {
    Numeric,
    Date,
}

impl TypePrompt {
    /// Parse the wire name; anything unknown is `None`
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "numeric" => Some(TypePrompt::Numeric),
            "date" => Some(TypePrompt::Date),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TypePrompt::Numeric => "numeric",
            TypePrompt::Date => "date",
        }
    }

    /// Sentence appended to the question
    pub fn instruction(self) -> &'static str {
        match self {
            TypePrompt::Numeric => " Output the result as a numeric value.",
            TypePrompt::Date => " Output the result in date format, e.g., 2023-11-20.",
        }
    }
}

/// Body of `POST /answer`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub text: Option<TextInput>,
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_prompt: Option<String>,
}

/// Body of `POST /summary`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub text: Option<TextInput>,
}

/// Response of both endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeTextReply {
    pub result: String,
}

/// Evaluates free-text functions
#[async_trait]
pub trait FreeTextClient: Send + Sync {
    async fn answer(
        &self,
        text: TextInput,
        question: &str,
        type_prompt: Option<TypePrompt>,
    ) -> Result<String>;

    async fn summary(&self, text: TextInput) -> Result<String>;
}

/// [`FreeTextClient`] over HTTP
pub struct HttpFreeTextClient {
    client: reqwest::Client,
    base: Url,
}

impl HttpFreeTextClient {
    pub fn new(base: Url, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    async fn post<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<String> {
        let url = self
            .base
            .join(path)
            .map_err(|e| SuqlError::Config(format!("invalid free-text server address: {e}")))?;

        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        let raw = response.text().await?;

        if !status.is_success() {
            return Err(SuqlError::FreeText(format!("{path} returned {status}: {raw}")));
        }

        let reply: FreeTextReply =
            serde_json::from_str(&raw).map_err(|e| SuqlError::Decode {
                detail: e.to_string(),
                raw: raw.clone(),
            })?;
        debug!("{} -> {}", path, reply.result);
        Ok(reply.result)
    }
}

#[async_trait]
impl FreeTextClient for HttpFreeTextClient {
    #[instrument(skip(self, text))]
    async fn answer(
        &self,
        text: TextInput,
        question: &str,
        type_prompt: Option<TypePrompt>,
    ) -> Result<String> {
        let body = AnswerRequest {
            text: Some(text),
            question: Some(question.to_string()),
            type_prompt: type_prompt.map(|t| t.as_str().to_string()),
        };
        self.post("answer", &body).await
    }

    #[instrument(skip(self, text))]
    async fn summary(&self, text: TextInput) -> Result<String> {
        self.post("summary", &SummaryRequest { text: Some(text) }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_input_accepts_string_or_list() {
        let one: AnswerRequest =
            serde_json::from_value(json!({ "text": "doc", "question": "q" })).unwrap();
        assert_eq!(one.text, Some(TextInput::One("doc".into())));
        assert_eq!(one.type_prompt, None);

        let many: SummaryRequest = serde_json::from_value(json!({ "text": ["a", "b"] })).unwrap();
        assert_eq!(many.text, Some(TextInput::Many(vec!["a".into(), "b".into()])));

        let missing: AnswerRequest = serde_json::from_value(json!({ "question": "q" })).unwrap();
        assert!(missing.text.is_none());
    }

    #[test]
    fn test_empty_inputs() {
        assert!(TextInput::from("").is_empty());
        assert!(TextInput::from(Vec::new()).is_empty());
        assert!(!TextInput::from("x").is_empty());
    }

    #[test]
    fn test_type_prompt() {
        assert_eq!(TypePrompt::parse("numeric"), Some(TypePrompt::Numeric));
        assert_eq!(TypePrompt::parse("text"), None);
        assert!(TypePrompt::Date.instruction().contains("2023-11-20"));
    }

    #[test]
    fn test_request_omits_absent_type_prompt() {
        let body = AnswerRequest {
            text: Some("doc".into()),
            question: Some("q".into()),
            type_prompt: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "text": "doc", "question": "q" })
        );
    }
}
