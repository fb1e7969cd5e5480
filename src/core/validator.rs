//! Validation runs: drive every member, collect errors, normalize values

use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use super::bag::{DEFAULT_NAMESPACE, ParameterBag};
use super::error::{ConfigError, ValidationError};
use super::resolver;
use super::schema::{CustomValidator, Member, ValidationTarget, ValidatorSchema, Verdict};
use super::validation::{FALLBACK_MESSAGE, PredicateLibrary, RuleChain};
use super::value;

/// Per-run remapping of declared field names to lookup keys
pub type AliasMap = HashMap<String, String>;

/// A reusable validator: a schema plus the predicates its rules refer to
///
/// Holds no per-run state, so one instance can serve concurrent requests.
///
/// # Example
///
/// ```rust,ignore
/// let validator = Validator::new(
///     ValidatorSchema::builder()
///         .field("age", [Rule::optional_with_default(18), Rule::new("isInt")])
///         .build()?,
/// );
///
/// let report = validator.validate(ParameterBag::new()).await?;
/// assert!(report.is_valid());
/// assert_eq!(report.get("age"), Some(&json!(18)));
/// ```
#[derive(Debug, Clone)]
pub struct Validator {
    schema: Arc<ValidatorSchema>,
    library: Arc<PredicateLibrary>,
}

impl Validator {
    /// Create a validator using the built-in predicates
    pub fn new(schema: ValidatorSchema) -> Self {
        Self::with_library(schema, Arc::new(PredicateLibrary::builtin()))
    }

    /// Create a validator using a specific predicate library
    pub fn with_library(schema: ValidatorSchema, library: Arc<PredicateLibrary>) -> Self {
        Self {
            schema: Arc::new(schema),
            library,
        }
    }

    pub fn schema(&self) -> &ValidatorSchema {
        &self.schema
    }

    pub fn library(&self) -> &PredicateLibrary {
        &self.library
    }

    /// Validate a bag with no aliases
    pub async fn validate(&self, bag: ParameterBag) -> Result<ValidationReport, ConfigError> {
        self.validate_with_aliases(bag, &AliasMap::new()).await
    }

    /// Validate a bag, looking declared fields up under their alias
    ///
    /// Every member is checked, in schema order, even after a failure. Field
    /// failures end up in the report; only configuration errors are returned
    /// as `Err`.
    pub async fn validate_with_aliases(
        &self,
        bag: ParameterBag,
        aliases: &AliasMap,
    ) -> Result<ValidationReport, ConfigError> {
        let mut report = ValidationReport::new(bag);

        for member in self.schema.members() {
            let outcome = match &member.target {
                ValidationTarget::Custom(validator) => {
                    run_custom(&member.name, validator.as_ref(), &report.bag).await
                }
                ValidationTarget::Field(chain) => self.check_field(member, chain, aliases, &mut report)?,
            };

            if let Err(message) = outcome {
                tracing::debug!(member = %member.name, error = %message, "parameter rejected");
                report.errors.push(message);
            }
        }

        tracing::debug!(
            members = self.schema.len(),
            errors = report.errors.len(),
            "parameter validation finished"
        );
        Ok(report)
    }

    /// Resolve, evaluate and write back one declarative field
    fn check_field(
        &self,
        member: &Member,
        chain: &RuleChain,
        aliases: &AliasMap,
        report: &mut ValidationReport,
    ) -> Result<Result<(), String>, ConfigError> {
        let key = aliases.get(&member.name).unwrap_or(&member.name);
        let param = resolver::resolve(&report.bag, key);
        let result = chain.evaluate(param.value.as_ref(), &self.library)?;

        if !result.pass {
            return Ok(Err(format!("{key} {}", result.message)));
        }

        let legal_value = result.legal_value.unwrap_or(Value::Null);
        let path = param.source_path();
        if path.is_empty() {
            value::assign(
                &mut report.parsed,
                &[DEFAULT_NAMESPACE.to_string(), key.clone()],
                legal_value,
            );
        } else {
            value::assign(&mut report.parsed, &path, legal_value);
        }
        Ok(Ok(()))
    }
}

/// Await a custom validator, demoting errors and panics to field failures
async fn run_custom(
    name: &str,
    validator: &dyn CustomValidator,
    bag: &ParameterBag,
) -> Result<(), String> {
    match AssertUnwindSafe(validator.validate(bag)).catch_unwind().await {
        Ok(Ok(Verdict::Pass)) => Ok(()),
        Ok(Ok(Verdict::Fail(message))) => Err(message),
        Ok(Err(err)) => {
            tracing::warn!(validator = %name, error = %err, "custom validator returned an error");
            let message = err.to_string();
            Err(if message.is_empty() {
                FALLBACK_MESSAGE.to_string()
            } else {
                message
            })
        }
        Err(panic) => {
            tracing::warn!(validator = %name, "custom validator panicked");
            Err(panic_message(panic.as_ref()).unwrap_or_else(|| FALLBACK_MESSAGE.to_string()))
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> Option<String> {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
}

/// Everything one validation run produced
///
/// `raw` is the untouched input; `parsed` starts as a copy of it and receives
/// the coerced value of every field that passed. Defaults of absent optional
/// fields live under `default.<field>`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    bag: ParameterBag,
    raw: Value,
    parsed: Value,
    errors: Vec<String>,
}

impl ValidationReport {
    fn new(bag: ParameterBag) -> Self {
        let raw = bag.to_value();
        Self {
            parsed: raw.clone(),
            raw,
            bag,
            errors: Vec::new(),
        }
    }

    /// True when no member failed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// All error messages in evaluation order
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Only the first error message
    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }

    /// Look a dotted path up in the parsed view
    ///
    /// A bare field name (or any path that misses) falls back to the default
    /// recorded for its last segment, so `get("age")` finds the default of an
    /// absent `age` without knowing which source it would have come from.
    pub fn get(&self, path: &str) -> Option<&Value> {
        value::lookup(&self.parsed, path)
            .filter(|v| !v.is_null())
            .or_else(|| {
                let key = path.rsplit('.').next().unwrap_or(path);
                value::lookup(&self.parsed, DEFAULT_NAMESPACE)
                    .and_then(|defaults| defaults.get(key))
                    .filter(|v| !v.is_null())
            })
    }

    /// Look a dotted path up in the raw, unconverted input
    pub fn get_raw(&self, path: &str) -> Option<&Value> {
        value::lookup(&self.raw, path)
    }

    /// The raw input as a JSON object keyed by source
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The normalized view as a JSON object keyed by source (plus `default`)
    pub fn parsed(&self) -> &Value {
        &self.parsed
    }

    /// The input bag
    pub fn bag(&self) -> &ParameterBag {
        &self.bag
    }

    pub fn into_parsed(self) -> Value {
        self.parsed
    }

    /// Turn a failed report into an error value
    pub fn into_result(self) -> Result<Self, ValidationError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(ValidationError::Failed {
                errors: self.errors,
            })
        }
    }
}
