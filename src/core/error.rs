//! Typed error handling for the validation engine
//!
//! Two families of failure exist and they travel differently:
//!
//! - [`ConfigError`]: the validator itself is mis-declared (a rule array holding
//!   something that is not a rule, a rule name the predicate library does not
//!   know, a broken schema file). These abort a run and are returned as `Err`.
//! - Field failures: recorded as plain messages inside a
//!   [`ValidationReport`](crate::core::validator::ValidationReport). They only
//!   become an error value ([`ValidationError`]) when a caller asks for one,
//!   e.g. the axum extractor.
//!
//! [`ParamError`] wraps everything that can reach an HTTP boundary and renders
//! it as a JSON body.
//!
//! # Example
//!
//! ```rust,ignore
//! match validator.validate(bag).await {
//!     Ok(report) if report.is_valid() => { /* use report.get("age") */ }
//!     Ok(report) => eprintln!("rejected: {:?}", report.errors()),
//!     Err(ConfigError::UnknownRule { rule }) => panic!("typo in rule {rule}"),
//!     Err(e) => panic!("{e}"),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// The main error type for everything that can leave the engine
#[derive(Debug, Error)]
pub enum ParamError {
    /// The validator is mis-declared
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// One or more fields were rejected
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request could not be turned into a parameter bag
    #[error(transparent)]
    Request(#[from] RequestError),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ParamError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ParamError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ParamError::Validation(_) => StatusCode::BAD_REQUEST,
            ParamError::Request(e) => e.status_code(),
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ParamError::Config(_) => "CONFIG_ERROR",
            ParamError::Validation(_) => "VALIDATION_ERROR",
            ParamError::Request(e) => e.error_code(),
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ParamError::Validation(ValidationError::Failed { errors }) => {
                Some(serde_json::json!({ "errors": errors }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ParamError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "parameter validation aborted");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// A validator declaration that can never run correctly
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A rule array holds an element that is not a rule
    #[error("validation array must contain only Rule instances (field '{field}', element {index})")]
    NonRuleElement { field: String, index: usize },

    /// A rule name that neither is `isOptional` nor exists in the predicate library
    #[error("unknown validation rule '{rule}'")]
    UnknownRule { rule: String },

    /// A custom validator not following the `validate<Name>` convention
    #[error("custom validator '{name}' must be named validate<Name>")]
    InvalidValidatorName { name: String },

    /// A declarative field using the prefix reserved for custom validators
    #[error("field '{name}' uses the validate<Name> prefix reserved for custom validators")]
    ReservedFieldName { name: String },

    /// The same member declared twice at one level
    #[error("member '{name}' is declared more than once")]
    DuplicateMember { name: String },

    /// A schema file references a schema it does not define
    #[error("schema '{name}' is not defined")]
    UnknownSchema { name: String },

    /// `extends` chains that loop back on themselves
    #[error("schema inheritance cycle: {}", chain.join(" -> "))]
    InheritanceCycle { chain: Vec<String> },

    /// A schema file that is not valid YAML for the expected shape
    #[error("failed to parse schema declarations: {message}")]
    Parse { message: String },
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Field-level rejection, surfaced as an error value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// At least one field failed; messages are in evaluation order
    #[error("parameter validation failed: {}", errors.join("; "))]
    Failed { errors: Vec<String> },
}

impl ValidationError {
    /// The collected messages
    pub fn errors(&self) -> &[String] {
        match self {
            ValidationError::Failed { errors } => errors,
        }
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors raised while assembling a parameter bag from an HTTP request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The query string could not be decoded
    #[error("invalid query string: {message}")]
    InvalidQuery { message: String },

    /// The body could not be read or decoded
    #[error("invalid request body: {message}")]
    InvalidBody { message: String },
}

impl RequestError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidQuery { .. } => "INVALID_QUERY",
            RequestError::InvalidBody { .. } => "INVALID_BODY",
        }
    }
}
