//! Templates by id

use crate::{PromptError, PromptTemplate, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Shared, thread-safe set of templates keyed by id
///
/// Registering an id that already exists replaces the old template, which is
/// how prompt files override the built-ins.
///
/// ```
/// use agent_prompt::{JinjaTemplate, PromptRegistry};
/// use serde_json::json;
///
/// let registry = PromptRegistry::new();
/// registry.register(JinjaTemplate::new("classify", "Needs data? {{ q }}").unwrap());
/// assert_eq!(
///     registry.render("classify", &json!({ "q": "top ETFs" })).unwrap(),
///     "Needs data? top ETFs"
/// );
/// ```
#[derive(Default)]
pub struct PromptRegistry {
    templates: RwLock<BTreeMap<String, Arc<dyn PromptTemplate>>>,
}

impl PromptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a template; true when an existing one was replaced
    pub fn register<T: PromptTemplate + 'static>(&self, template: T) -> bool {
        let Ok(mut templates) = self.templates.write() else {
            return false;
        };
        let id = template.id().to_string();
        let replaced = templates.insert(id.clone(), Arc::new(template)).is_some();
        if replaced {
            debug!("Template {} replaced", id);
        }
        replaced
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn PromptTemplate>> {
        self.templates.read().ok()?.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Render the template registered as `id`
    pub fn render(&self, id: &str, bindings: &serde_json::Value) -> Result<String> {
        self.get(id)
            .ok_or_else(|| PromptError::UnknownTemplate(id.to_string()))?
            .render(bindings)
    }

    /// Registered ids in sorted order
    pub fn ids(&self) -> Vec<String> {
        self.templates
            .read()
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.templates.read().map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for PromptRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptRegistry").field("ids", &self.ids()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JinjaTemplate;
    use serde_json::json;

    #[test]
    fn test_empty_registry() {
        let registry = PromptRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.ids().is_empty());
    }

    #[test]
    fn test_replacing_a_template() {
        let registry = PromptRegistry::new();
        assert!(!registry.register(JinjaTemplate::new("answer_qa", "built-in").unwrap()));
        assert!(registry.register(JinjaTemplate::new("answer_qa", "from file").unwrap()));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.render("answer_qa", &json!({})).unwrap(), "from file");
    }

    #[test]
    fn test_unknown_template() {
        let err = PromptRegistry::new().render("parser_suql", &json!({})).unwrap_err();
        assert!(matches!(err, PromptError::UnknownTemplate(id) if id == "parser_suql"));
    }

    #[test]
    fn test_ids_sorted() {
        let registry = PromptRegistry::new();
        registry.register(JinjaTemplate::new("parser_suql", "").unwrap());
        registry.register(JinjaTemplate::new("answer_qa", "").unwrap());
        assert_eq!(registry.ids(), vec!["answer_qa", "parser_suql"]);
    }
}
