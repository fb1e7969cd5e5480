//! Validator declarations and member discovery
//!
//! A validator is declared once, through a [`SchemaBuilder`], as an ordered
//! list of members. Each member is either a declarative field (a
//! [`RuleChain`]) or a custom validator (an async function named
//! `validate<Name>`). Schemas can extend other schemas: the parent's members
//! come after the child's own, and a name already declared by the child
//! shadows the parent's member of the same name.
//!
//! # Example
//!
//! ```rust,ignore
//! let base = ValidatorSchema::builder()
//!     .field("token", [Rule::new("isLength").with_param(json!({"min": 8}))])
//!     .build()?;
//!
//! let signup = ValidatorSchema::builder()
//!     .field("email", [Rule::new("isEmail").with_message("is not an email")])
//!     .custom_fn("validatePasswords", |bag| async move {
//!         Ok(bag.get("body.password") == bag.get("body.confirm"))
//!     })
//!     .extends(&base)
//!     .build()?;
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use super::bag::ParameterBag;
use super::error::ConfigError;
use super::validation::{FALLBACK_MESSAGE, Rule, RuleChain};

/// What a custom validator concluded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    /// Rejected; the message is reported verbatim
    Fail(String),
}

impl Verdict {
    pub fn fail(message: impl Into<String>) -> Self {
        Verdict::Fail(message.into())
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

impl From<bool> for Verdict {
    fn from(pass: bool) -> Self {
        if pass {
            Verdict::Pass
        } else {
            Verdict::fail(FALLBACK_MESSAGE)
        }
    }
}

impl From<&str> for Verdict {
    fn from(message: &str) -> Self {
        Verdict::fail(message)
    }
}

impl From<String> for Verdict {
    fn from(message: String) -> Self {
        Verdict::Fail(message)
    }
}

impl From<Result<(), String>> for Verdict {
    fn from(result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Verdict::Pass,
            Err(message) => Verdict::Fail(message),
        }
    }
}

/// A validation target checked by code instead of a rule chain
///
/// Expected rejections are returned as [`Verdict::Fail`]. An `Err` is treated
/// as an unexpected failure: it does not abort the run, its message is
/// recorded as the field error instead.
#[async_trait]
pub trait CustomValidator: Send + Sync {
    async fn validate(&self, params: &ParameterBag) -> anyhow::Result<Verdict>;
}

/// Adapter turning an async closure into a [`CustomValidator`]
pub struct FnValidator<F>(F);

impl<F> FnValidator<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F, Fut, V> CustomValidator for FnValidator<F>
where
    F: Fn(ParameterBag) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
    V: Into<Verdict> + Send + 'static,
{
    async fn validate(&self, params: &ParameterBag) -> anyhow::Result<Verdict> {
        (self.0)(params.clone()).await.map(Into::into)
    }
}

/// A discovered member, resolved once at registration
#[derive(Clone)]
pub enum ValidationTarget {
    Field(RuleChain),
    Custom(Arc<dyn CustomValidator>),
}

impl fmt::Debug for ValidationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationTarget::Field(chain) => f.debug_tuple("Field").field(chain).finish(),
            ValidationTarget::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A named validation target
#[derive(Debug, Clone)]
pub struct Member {
    pub name: String,
    pub target: ValidationTarget,
}

/// Whether `name` follows the `validate<Name>` custom-validator convention
pub fn is_custom_validator_name(name: &str) -> bool {
    name.strip_prefix("validate")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
}

/// The flattened, ordered member list of a validator
#[derive(Debug, Clone, Default)]
pub struct ValidatorSchema {
    members: Vec<Member>,
}

impl ValidatorSchema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Members in evaluation order
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Member names in evaluation order
    pub fn names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// A member as declared, before discovery classifies it
enum Declaration {
    Rules(Vec<Rule>),
    Custom(Arc<dyn CustomValidator>),
    Untyped(Value),
}

/// Collects member declarations and ancestors, then discovers targets
#[derive(Default)]
pub struct SchemaBuilder {
    declarations: Vec<(String, Declaration)>,
    parents: Vec<ValidatorSchema>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field validated by a rule chain
    pub fn field(mut self, name: impl Into<String>, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.declarations
            .push((name.into(), Declaration::Rules(rules.into_iter().collect())));
        self
    }

    /// Declare a member from untyped data (e.g. a schema file)
    ///
    /// Arrays must hold only rule-shaped objects; anything else that is not
    /// an array is ignored by discovery.
    pub fn declare(mut self, name: impl Into<String>, value: Value) -> Self {
        self.declarations
            .push((name.into(), Declaration::Untyped(value)));
        self
    }

    /// Declare a custom validator
    pub fn custom(mut self, name: impl Into<String>, validator: impl CustomValidator + 'static) -> Self {
        self.declarations
            .push((name.into(), Declaration::Custom(Arc::new(validator))));
        self
    }

    /// Declare a custom validator from an async closure over the raw bag
    pub fn custom_fn<F, Fut, V>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(ParameterBag) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
        V: Into<Verdict> + Send + 'static,
    {
        self.custom(name, FnValidator::new(f))
    }

    /// Inherit the members of `parent`
    ///
    /// Parents added first are closer ancestors and come first.
    pub fn extends(mut self, parent: &ValidatorSchema) -> Self {
        self.parents.push(parent.clone());
        self
    }

    /// Run discovery and produce the schema
    pub fn build(self) -> Result<ValidatorSchema, ConfigError> {
        let members = discover(self.declarations, &self.parents)?;
        tracing::debug!(members = members.len(), "validator schema built");
        Ok(ValidatorSchema { members })
    }
}

/// Classify own declarations, then append inherited members not shadowed
fn discover(
    declarations: Vec<(String, Declaration)>,
    parents: &[ValidatorSchema],
) -> Result<Vec<Member>, ConfigError> {
    let mut seen = HashSet::new();
    let mut members = Vec::new();

    for (name, declaration) in declarations {
        if !seen.insert(name.clone()) {
            return Err(ConfigError::DuplicateMember { name });
        }
        if let Some(target) = classify(&name, declaration)? {
            members.push(Member { name, target });
        }
    }

    for parent in parents {
        for member in parent.members() {
            if seen.insert(member.name.clone()) {
                members.push(member.clone());
            }
        }
    }

    Ok(members)
}

fn classify(name: &str, declaration: Declaration) -> Result<Option<ValidationTarget>, ConfigError> {
    let custom_name = is_custom_validator_name(name);

    match declaration {
        Declaration::Custom(_) if !custom_name => Err(ConfigError::InvalidValidatorName {
            name: name.to_string(),
        }),
        Declaration::Custom(validator) => Ok(Some(ValidationTarget::Custom(validator))),
        Declaration::Rules(_) | Declaration::Untyped(Value::Array(_)) if custom_name => {
            Err(ConfigError::ReservedFieldName {
                name: name.to_string(),
            })
        }
        Declaration::Rules(rules) => Ok(Some(ValidationTarget::Field(RuleChain::new(rules)))),
        Declaration::Untyped(Value::Array(elements)) => {
            let rules = elements
                .iter()
                .enumerate()
                .map(|(index, element)| {
                    Rule::from_declaration(element).ok_or_else(|| ConfigError::NonRuleElement {
                        field: name.to_string(),
                        index,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(ValidationTarget::Field(RuleChain::new(rules))))
        }
        Declaration::Untyped(_) => Ok(None),
    }
}
