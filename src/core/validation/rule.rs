//! A single named check

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::validators::PredicateLibrary;
use crate::core::error::ConfigError;
use crate::core::value::to_loose_string;

/// Reserved rule name marking a field optional; its first param is the default
pub const OPTIONAL: &str = "isOptional";

/// Message used when a failing rule or custom validator supplies none
pub const FALLBACK_MESSAGE: &str = "invalid parameter";

/// An atomic validation rule: a predicate name, a message and extra parameters
///
/// # Example
///
/// ```rust,ignore
/// let rules = vec![
///     Rule::optional_with_default(18),
///     Rule::new("isInt").with_message("must be an integer").with_param(json!({"min": 0})),
/// ];
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    #[serde(default, alias = "msg", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Value>,
}

/// Outcome of a single rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleResult {
    pub pass: bool,
    pub message: String,
}

impl RuleResult {
    pub fn pass() -> Self {
        Self {
            pass: true,
            message: String::new(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            pass: false,
            message: message.into(),
        }
    }
}

impl Rule {
    /// Create a rule without message or parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: None,
            params: Vec::new(),
        }
    }

    /// Create a rule from all three parts at once
    ///
    /// An empty message means "use the fallback".
    pub fn with(name: impl Into<String>, message: impl Into<String>, params: Vec<Value>) -> Self {
        Self::new(name).with_message(message).with_params(params)
    }

    /// Mark a field optional with no default
    pub fn optional() -> Self {
        Self::new(OPTIONAL)
    }

    /// Mark a field optional, substituting `default` when it is absent
    pub fn optional_with_default(default: impl Into<Value>) -> Self {
        Self::optional().with_param(default)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.message = (!message.is_empty()).then_some(message);
        self
    }

    pub fn with_param(mut self, param: impl Into<Value>) -> Self {
        self.params.push(param.into());
        self
    }

    pub fn with_params(mut self, params: impl IntoIterator<Item = Value>) -> Self {
        self.params.extend(params);
        self
    }

    /// True for the reserved `isOptional` marker
    pub fn is_optional(&self) -> bool {
        self.name == OPTIONAL
    }

    /// Parse an untyped declaration element
    ///
    /// Returns `None` when the element is not shaped like a rule (an object
    /// with a string `name`).
    pub fn from_declaration(element: &Value) -> Option<Self> {
        match element {
            Value::Object(map) if map.get("name").is_some_and(Value::is_string) => {
                serde_json::from_value(element.clone()).ok()
            }
            _ => None,
        }
    }

    /// Run the rule against a present value
    ///
    /// The value is stringified before the predicate sees it. A name that the
    /// library does not know is a configuration error, not a failed check.
    pub fn validate(&self, field: &Value, library: &PredicateLibrary) -> Result<RuleResult, ConfigError> {
        if self.is_optional() {
            return Ok(RuleResult::pass());
        }

        let predicate = library.get(&self.name).ok_or_else(|| ConfigError::UnknownRule {
            rule: self.name.clone(),
        })?;

        if predicate(to_loose_string(field).as_str(), self.params.as_slice()) {
            Ok(RuleResult::pass())
        } else {
            Ok(RuleResult::fail(
                self.message
                    .as_deref()
                    .filter(|m| !m.is_empty())
                    .unwrap_or(FALLBACK_MESSAGE),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn library() -> PredicateLibrary {
        PredicateLibrary::builtin()
    }

    #[test]
    fn test_optional_always_passes() {
        let rule = Rule::optional_with_default(3);
        let result = rule.validate(&json!("anything"), &PredicateLibrary::new()).unwrap();
        assert!(result.pass);
    }

    #[test]
    fn test_failing_rule_uses_custom_message() {
        let rule = Rule::new("isInt").with_message("must be an integer");
        let result = rule.validate(&json!("abc"), &library()).unwrap();
        assert_eq!(result, RuleResult::fail("must be an integer"));
    }

    #[test]
    fn test_failing_rule_without_message_uses_fallback() {
        let rule = Rule::with("isInt", "", vec![]);
        let result = rule.validate(&json!("abc"), &library()).unwrap();
        assert_eq!(result.message, FALLBACK_MESSAGE);
    }

    #[test]
    fn test_value_is_stringified_before_check() {
        let rule = Rule::new("isInt");
        assert!(rule.validate(&json!(42), &library()).unwrap().pass);
        assert!(!rule.validate(&json!(true), &library()).unwrap().pass);
    }

    #[test]
    fn test_params_forwarded_to_predicate() {
        let rule = Rule::new("isLength").with_param(json!({"min": 3}));
        assert!(!rule.validate(&json!("ab"), &library()).unwrap().pass);
        assert!(rule.validate(&json!("abc"), &library()).unwrap().pass);
    }

    #[test]
    fn test_unknown_rule_is_config_error() {
        let rule = Rule::new("isBanana");
        let err = rule.validate(&json!("x"), &library()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownRule {
                rule: "isBanana".to_string()
            }
        );
    }

    #[test]
    fn test_from_declaration() {
        let rule = Rule::from_declaration(&json!({"name": "isInt", "msg": "nope", "params": [{"min": 1}]}))
            .expect("rule-shaped element");
        assert_eq!(rule.name, "isInt");
        assert_eq!(rule.message.as_deref(), Some("nope"));
        assert_eq!(rule.params, vec![json!({"min": 1})]);

        assert!(Rule::from_declaration(&json!("isInt")).is_none());
        assert!(Rule::from_declaration(&json!({"message": "no name"})).is_none());
        assert!(Rule::from_declaration(&json!({"name": 3})).is_none());
    }
}
