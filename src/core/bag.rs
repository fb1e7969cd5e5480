//! The four-source parameter bag

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::value;

/// Namespace in the parsed view holding defaults of absent optional fields
pub const DEFAULT_NAMESPACE: &str = "default";

/// Where a parameter was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Query,
    Body,
    Path,
    Header,
}

impl Source {
    /// Lookup order used when resolving a field
    pub const PRIORITY: [Source; 4] = [Source::Query, Source::Body, Source::Path, Source::Header];

    /// The segment naming this source in dotted paths
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Query => "query",
            Source::Body => "body",
            Source::Path => "path",
            Source::Header => "header",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw incoming parameters, split by source
///
/// # Example
///
/// ```rust,ignore
/// let bag = ParameterBag::new()
///     .with(Source::Query, "page", "2")
///     .with(Source::Header, "x-tenant", "acme");
///
/// assert_eq!(bag.get("query.page"), Some(&json!("2")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterBag {
    #[serde(default)]
    pub query: Map<String, Value>,
    #[serde(default)]
    pub body: Map<String, Value>,
    #[serde(default)]
    pub path: Map<String, Value>,
    #[serde(default)]
    pub header: Map<String, Value>,
}

impl ParameterBag {
    /// Create an empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, source: Source, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(source, key, value);
        self
    }

    /// Insert a value into one source, replacing any previous value
    pub fn insert(&mut self, source: Source, key: impl Into<String>, value: impl Into<Value>) {
        self.source_mut(source).insert(key.into(), value.into());
    }

    /// Borrow one source
    pub fn source(&self, source: Source) -> &Map<String, Value> {
        match source {
            Source::Query => &self.query,
            Source::Body => &self.body,
            Source::Path => &self.path,
            Source::Header => &self.header,
        }
    }

    /// Mutably borrow one source
    pub fn source_mut(&mut self, source: Source) -> &mut Map<String, Value> {
        match source {
            Source::Query => &mut self.query,
            Source::Body => &mut self.body,
            Source::Path => &mut self.path,
            Source::Header => &mut self.header,
        }
    }

    /// Look up a dotted path whose first segment names the source
    pub fn get(&self, path: &str) -> Option<&Value> {
        let (head, rest) = path.split_once('.')?;
        let source = Source::PRIORITY.into_iter().find(|s| s.as_str() == head)?;
        let (key, tail) = match rest.split_once('.') {
            Some((key, tail)) => (key, Some(tail)),
            None => (rest, None),
        };
        let found = self.source(source).get(key)?;
        match tail {
            Some(tail) => value::lookup(found, tail),
            None => Some(found),
        }
    }

    /// The bag as a single JSON object keyed by source name
    pub fn to_value(&self) -> Value {
        let mut root = Map::new();
        for source in Source::PRIORITY {
            root.insert(
                source.as_str().to_string(),
                Value::Object(self.source(source).clone()),
            );
        }
        Value::Object(root)
    }

    /// True when no source holds anything
    pub fn is_empty(&self) -> bool {
        Source::PRIORITY
            .iter()
            .all(|source| self.source(*source).is_empty())
    }
}
