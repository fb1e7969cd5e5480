//! Ordered rules for one field

use serde_json::Value;

use super::filters::Coercion;
use super::rule::Rule;
use super::validators::PredicateLibrary;
use crate::core::error::ConfigError;

/// Message recorded when a required field is absent
pub const REQUIRED_MESSAGE: &str = "field is required";

/// Outcome of evaluating a whole chain
#[derive(Debug, Clone, PartialEq)]
pub struct FieldResult {
    pub pass: bool,
    pub message: String,
    /// The normalized value to write back; `None` for a failure or an
    /// absent optional field without default
    pub legal_value: Option<Value>,
}

impl FieldResult {
    fn pass(legal_value: Option<Value>) -> Self {
        Self {
            pass: true,
            message: String::new(),
            legal_value,
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            pass: false,
            message: message.into(),
            legal_value: None,
        }
    }
}

/// The full validation and coercion policy of one declared field
///
/// Rules run in declaration order and stop at the first failure. Presence of
/// `isOptional` anywhere in the chain makes an absent value acceptable; its
/// first parameter becomes the default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleChain {
    rules: Vec<Rule>,
}

impl RuleChain {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Whether absent values are tolerated
    pub fn is_optional(&self) -> bool {
        self.rules.iter().any(Rule::is_optional)
    }

    /// Default declared by the first `isOptional` rule
    pub fn default_value(&self) -> Option<&Value> {
        self.rules
            .iter()
            .find(|rule| rule.is_optional())
            .and_then(|rule| rule.params.first())
    }

    /// Evaluate a raw value (`None` when the field is absent)
    pub fn evaluate(
        &self,
        raw: Option<&Value>,
        library: &PredicateLibrary,
    ) -> Result<FieldResult, ConfigError> {
        let Some(raw) = raw else {
            return Ok(if self.is_optional() {
                FieldResult::pass(self.default_value().cloned())
            } else {
                FieldResult::fail(REQUIRED_MESSAGE)
            });
        };

        for rule in &self.rules {
            let result = rule.validate(raw, library)?;
            if !result.pass {
                return Ok(FieldResult::fail(result.message));
            }
        }

        Ok(FieldResult::pass(Some(self.coerce(raw))))
    }

    /// First coercing rule in the chain decides the output type
    fn coerce(&self, value: &Value) -> Value {
        self.rules
            .iter()
            .find_map(|rule| Coercion::for_rule(&rule.name))
            .map_or_else(|| value.clone(), |coercion| coercion.apply(value))
    }
}

impl From<Vec<Rule>> for RuleChain {
    fn from(rules: Vec<Rule>) -> Self {
        Self::new(rules)
    }
}

impl FromIterator<Rule> for RuleChain {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
