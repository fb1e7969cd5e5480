//! # This-Params
//!
//! Declarative validation of incoming request parameters.
//!
//! ## Features
//!
//! - **Rule Chains**: Each field declares an ordered list of named rules (`isInt`, `isEmail`, ...)
//! - **Multi-Source Lookup**: Fields are found in query, body, path or headers, first match wins
//! - **Optional Fields & Defaults**: `isOptional` tolerates absence and supplies a default
//! - **Type Coercion**: `isInt`, `isFloat` and `isBoolean` fields come out typed
//! - **Custom Validators**: Async `validate<Name>` functions alongside declarative rules
//! - **Inheritance**: Schemas extend other schemas, children shadow parents
//! - **Aliases**: Per-run remapping of declared names to actual parameter keys
//! - **Axum Integration**: `ValidatedParams<T>` extractor with JSON error responses
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use this_params::prelude::*;
//!
//! let validator = Validator::new(
//!     ValidatorSchema::builder()
//!         .field("age", [Rule::optional_with_default(18), Rule::new("isInt")])
//!         .field("email", [Rule::new("isEmail").with_message("is not an email")])
//!         .custom_fn("validateTerms", |bag| async move {
//!             Ok(if bag.get("body.terms").is_some() { Verdict::Pass } else { Verdict::fail("terms must be accepted") })
//!         })
//!         .build()?,
//! );
//!
//! let bag = ParameterBag::new()
//!     .with(Source::Query, "email", "ana@example.com")
//!     .with(Source::Body, "terms", "on");
//!
//! let report = validator.validate(bag).await?;
//! assert!(report.is_valid());
//! assert_eq!(report.get("age"), Some(&json!(18)));
//! ```

pub mod config;
pub mod core;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Engine ===
    pub use crate::core::{
        bag::{ParameterBag, Source},
        schema::{CustomValidator, SchemaBuilder, ValidatorSchema, Verdict},
        validation::{PredicateLibrary, Rule, RuleChain},
        validator::{AliasMap, ValidationReport, Validator},
    };

    // === Errors ===
    pub use crate::core::error::{ConfigError, ParamError, RequestError, ValidationError};

    // === Axum ===
    pub use crate::core::validation::extractor::{ParamSchema, ValidatedParams};

    // === Config ===
    pub use crate::config::SchemaConfig;

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use serde_json::{Value, json};
}
