use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const ARGUMENT_SEPARATOR: char = '\u{241f}';

/// Memoised free-text function results
///
/// Keyed by function name, then by argument. The cache travels with the
/// dialogue: each turn starts from the previous turn's cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionCache {
    entries: BTreeMap<String, BTreeMap<String, String>>,
}

impl ExecutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Argument key for a value and an optional question
    pub fn argument(value: &str, question: Option<&str>) -> String {
        match question {
            Some(q) => format!("{value}{ARGUMENT_SEPARATOR}{q}"),
            None => value.to_string(),
        }
    }

    pub fn get(&self, function: &str, argument: &str) -> Option<&str> {
        self.entries
            .get(function)
            .and_then(|args| args.get(argument))
            .map(String::as_str)
    }

    pub fn insert(&mut self, function: &str, argument: String, result: String) {
        self.entries
            .entry(function.to_string())
            .or_default()
            .insert(argument, result);
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut cache = ExecutionCache::new();
        let arg = ExecutionCache::argument("QQQ", Some("Is it tech?"));
        cache.insert("answer", arg.clone(), "Yes".into());

        assert_eq!(cache.get("answer", &arg), Some("Yes"));
        assert_eq!(cache.get("summary", &arg), None);
        assert_eq!(cache.get("answer", "QQQ"), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_round_trips_through_json() {
        let mut cache = ExecutionCache::new();
        cache.insert("summary", "SPY".into(), "An S&P 500 fund".into());

        let json = serde_json::to_string(&cache).unwrap();
        let back: ExecutionCache = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cache);
    }
}
