//! Multi-source parameter lookup

use serde_json::Value;

use super::bag::{ParameterBag, Source};
use super::value::is_truthy;

/// Outcome of looking a key up across all sources
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParam {
    /// The key that was looked up (after alias substitution)
    pub key: String,
    /// The value found, `None` when no source held a truthy one
    pub value: Option<Value>,
    /// Which source supplied the value
    pub source: Option<Source>,
}

impl ResolvedParam {
    /// Path of the value in the bag, empty when nothing was found
    pub fn source_path(&self) -> Vec<String> {
        match self.source {
            Some(source) => vec![source.as_str().to_string(), self.key.clone()],
            None => Vec::new(),
        }
    }
}

/// Find `key` in the bag, trying query, body, path and header in that order
///
/// The first source whose value is truthy wins. A falsy value (`0`, `""`,
/// `false`, `null`) is treated exactly like a missing one, so
/// `?age=0` is indistinguishable from no `age` at all.
pub fn resolve(bag: &ParameterBag, key: &str) -> ResolvedParam {
    for source in Source::PRIORITY {
        if let Some(value) = bag.source(source).get(key).filter(|v| is_truthy(v)) {
            return ResolvedParam {
                key: key.to_string(),
                value: Some(value.clone()),
                source: Some(source),
            };
        }
    }

    ResolvedParam {
        key: key.to_string(),
        value: None,
        source: None,
    }
}
