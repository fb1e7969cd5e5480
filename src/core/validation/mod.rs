//! Rules, rule chains and the predicates behind them
//!
//! This module provides the declarative half of the engine: a [`Rule`] names a
//! predicate, a [`RuleChain`] strings rules together for one field and decides
//! optionality, defaults and coercion. The [`extractor`] plugs a whole
//! validator into axum handlers.

pub mod chain;
pub mod extractor;
pub mod filters;
pub mod rule;
pub mod validators;

pub use chain::{FieldResult, REQUIRED_MESSAGE, RuleChain};
pub use extractor::{ParamSchema, ValidatedParams};
pub use filters::Coercion;
pub use rule::{FALLBACK_MESSAGE, OPTIONAL, Rule, RuleResult};
pub use validators::{Predicate, PredicateLibrary};
