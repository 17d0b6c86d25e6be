//! The template abstraction

use crate::Result;
use serde_json::Value;

/// A named prompt rendered from a JSON object of bindings
///
/// Object-safe, so the registry can hold built-in and file-loaded templates
/// behind the same pointer type.
///
/// ```
/// use agent_prompt::{JinjaTemplate, PromptTemplate};
/// use serde_json::json;
///
/// let template = JinjaTemplate::new("ask", "Question: {{ question }}").unwrap();
/// assert_eq!(template.id(), "ask");
/// assert_eq!(
///     template.render(&json!({ "question": "Which ETFs hold gold?" })).unwrap(),
///     "Question: Which ETFs hold gold?"
/// );
/// ```
pub trait PromptTemplate: Send + Sync {
    /// Template id, e.g. `parser_suql`
    fn id(&self) -> &str;

    fn render(&self, bindings: &Value) -> Result<String>;

    /// Unrendered source text
    fn source(&self) -> &str;
}
