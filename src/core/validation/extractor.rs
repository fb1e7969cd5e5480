//! Axum extractor for validated request parameters
//!
//! This module provides the `ValidatedParams<T>` extractor that gathers the
//! query string, path parameters, headers and body of a request into a
//! [`ParameterBag`], runs `T`'s validator over it and hands the handler the
//! resulting report.

use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use axum::{Form, body::Bytes};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::marker::PhantomData;

use crate::core::bag::ParameterBag;
use crate::core::error::{ParamError, RequestError};
use crate::core::validator::{AliasMap, ValidationReport, Validator};

/// Types that know how to validate the parameters of a route
pub trait ParamSchema {
    /// The validator to run
    ///
    /// Called once per request; keep a built validator in a `OnceLock` and
    /// clone it when the schema is expensive to construct.
    fn validator() -> Validator;

    /// Aliases applied to the run
    fn aliases() -> AliasMap {
        AliasMap::new()
    }
}

/// Axum extractor yielding the validation report of a request
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn signup(ValidatedParams(report, _): ValidatedParams<SignupParams>) -> Json<Value> {
///     // report.is_valid() is guaranteed here
///     Json(json!({ "age": report.get("age") }))
/// }
/// ```
pub struct ValidatedParams<T>(pub ValidationReport, pub PhantomData<T>);

impl<T> ValidatedParams<T> {
    /// Wrap a successful report
    pub fn new(report: ValidationReport) -> Self {
        Self(report, PhantomData)
    }

    /// Get the inner report
    pub fn into_inner(self) -> ValidationReport {
        self.0
    }
}

impl<T> std::ops::Deref for ValidatedParams<T> {
    type Target = ValidationReport;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequest<S> for ValidatedParams<T>
where
    S: Send + Sync,
    T: ParamSchema + Send + Sync,
{
    type Rejection = ParamError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bag = extract_bag(req, state).await?;
        let report = T::validator()
            .validate_with_aliases(bag, &T::aliases())
            .await?
            .into_result()?;
        Ok(Self::new(report))
    }
}

/// Split a request into the four parameter sources
///
/// Path parameters are empty when the route declares none. Bodies are read as
/// a JSON object or an urlencoded form depending on `Content-Type`; any other
/// (or missing) content type yields an empty body source.
pub async fn extract_bag<S>(req: Request, state: &S) -> Result<ParameterBag, RequestError>
where
    S: Send + Sync,
{
    let (mut parts, body) = req.into_parts();
    let mut bag = ParameterBag::new();

    let Query(query) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri).map_err(|e| {
        RequestError::InvalidQuery {
            message: e.body_text(),
        }
    })?;
    bag.query = into_object(query);

    bag.path = Path::<HashMap<String, String>>::from_request_parts(&mut parts, state)
        .await
        .map(|Path(params)| into_object(params))
        .unwrap_or_default();

    bag.header = headers(&parts);

    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let req = Request::from_parts(parts, body);

    bag.body = if content_type.starts_with("application/json") {
        json_body(req, state).await?
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(form) = Form::<HashMap<String, String>>::from_request(req, state)
            .await
            .map_err(|e| RequestError::InvalidBody {
                message: e.body_text(),
            })?;
        into_object(form)
    } else {
        Map::new()
    };

    Ok(bag)
}

async fn json_body<S>(req: Request, state: &S) -> Result<Map<String, Value>, RequestError>
where
    S: Send + Sync,
{
    let bytes = Bytes::from_request(req, state)
        .await
        .map_err(|e| RequestError::InvalidBody {
            message: e.body_text(),
        })?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(RequestError::InvalidBody {
            message: "expected a JSON object".to_string(),
        }),
        Err(e) => Err(RequestError::InvalidBody {
            message: e.to_string(),
        }),
    }
}

/// Header names are already lower-case; values that are not UTF-8 are skipped
fn headers(parts: &Parts) -> Map<String, Value> {
    parts
        .headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), Value::String(v.to_string())))
        })
        .collect()
}

fn into_object(map: HashMap<String, String>) -> Map<String, Value> {
    map.into_iter().map(|(k, v)| (k, Value::String(v))).collect()
}
