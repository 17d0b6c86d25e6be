//! Jinja2 templates rendered with MiniJinja

use crate::{PromptError, PromptTemplate, Result};
use minijinja::Environment;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(.*?)\}\}").expect("placeholder pattern is valid"));

/// A prompt in Jinja2 syntax
///
/// Block tags swallow their own line (`trim_blocks` and `lstrip_blocks`), so
/// `{% for %}`/`{% if %}` can sit on separate lines without leaving blank
/// lines in the prompt. Undefined bindings render as empty text.
pub struct JinjaTemplate {
    id: String,
    source: String,
}

impl JinjaTemplate {
    /// Parse `source`; syntax errors are reported here rather than at render time
    ///
    /// ```
    /// use agent_prompt::JinjaTemplate;
    ///
    /// assert!(JinjaTemplate::new("ok", "Target: {{ query }}").is_ok());
    /// assert!(JinjaTemplate::new("broken", "{% if %}").is_err());
    /// ```
    pub fn new(id: impl Into<String>, source: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let source = source.into();

        environment()
            .template_from_str(&source)
            .map_err(|e| PromptError::Syntax {
                id: id.clone(),
                detail: e.to_string(),
            })?;

        Ok(Self { id, source })
    }
}

fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env
}

impl PromptTemplate for JinjaTemplate {
    fn id(&self) -> &str {
        &self.id
    }

    fn render(&self, bindings: &serde_json::Value) -> Result<String> {
        let context = minijinja::Value::from_serialize(bindings);
        environment()
            .render_str(&self.source, context)
            .map_err(|e| PromptError::Render {
                id: self.id.clone(),
                detail: e.to_string(),
            })
    }

    fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for JinjaTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JinjaTemplate")
            .field("id", &self.id)
            .field("len", &self.source.len())
            .finish()
    }
}

/// Placeholders (`{{ ... }}`) that survived rendering
///
/// A rendered prompt should not contain any; when it does, a binding was
/// misspelled or a value itself contained template syntax.
pub fn unreplaced_placeholders(rendered: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(rendered)
        .filter_map(|c| c.get(1).map(|m| m.as_str().trim().to_string()))
        .collect()
}
