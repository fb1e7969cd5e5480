//! Core module containing the validation engine

pub mod bag;
pub mod error;
pub mod resolver;
pub mod schema;
pub mod validation;
pub mod validator;
pub mod value;

pub use bag::{DEFAULT_NAMESPACE, ParameterBag, Source};
pub use error::{ConfigError, ErrorResponse, ParamError, RequestError, ValidationError};
pub use resolver::{ResolvedParam, resolve};
pub use schema::{
    CustomValidator, FnValidator, Member, SchemaBuilder, ValidationTarget, ValidatorSchema, Verdict,
};
pub use validation::{ParamSchema, PredicateLibrary, Rule, RuleChain, ValidatedParams};
pub use validator::{AliasMap, ValidationReport, Validator};
