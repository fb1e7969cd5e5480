//! Predicate library backing rule names
//!
//! Every rule other than `isOptional` is a lookup in a [`PredicateLibrary`]:
//! a map from a rule name to a function receiving the stringified field value
//! and the rule's extra parameters. [`PredicateLibrary::builtin`] ships the
//! rule names people already write in declarations (`isInt`, `isEmail`,
//! `isLength`, ...), with the same option objects (`{ "min": 1 }`).

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use uuid::Uuid;
use validator::{ValidateEmail, ValidateIp, ValidateUrl};

use crate::core::value::to_loose_string;

/// A boolean check over a stringified value and the rule's parameters
pub type Predicate = Arc<dyn Fn(&str, &[Value]) -> bool + Send + Sync>;

/// Named predicates available to rules
#[derive(Clone, Default)]
pub struct PredicateLibrary {
    predicates: HashMap<String, Predicate>,
}

impl fmt::Debug for PredicateLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self.names();
        names.sort_unstable();
        f.debug_struct("PredicateLibrary")
            .field("predicates", &names)
            .finish()
    }
}

impl PredicateLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Library with all built-in predicates registered
    pub fn builtin() -> Self {
        let mut library = Self::new();
        library
            .register("isInt", is_int)
            .register("isFloat", is_float)
            .register("isNumeric", is_numeric)
            .register("isBoolean", is_boolean)
            .register("isEmail", |s, _| s.to_owned().validate_email())
            .register("isURL", |s, _| s.to_owned().validate_url())
            .register("isIP", is_ip)
            .register("isUUID", is_uuid)
            .register("isLength", is_length)
            .register("isEmpty", is_empty)
            .register("isAlpha", |s, _| {
                !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic())
            })
            .register("isAlphanumeric", |s, _| {
                !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())
            })
            .register("isLowercase", |s, _| s == s.to_lowercase())
            .register("isUppercase", |s, _| s == s.to_uppercase())
            .register("isIn", is_in)
            .register("matches", matches_pattern)
            .register("equals", |s, params| {
                params.first().is_some_and(|p| to_loose_string(p) == s)
            })
            .register("contains", |s, params| {
                params.first().is_some_and(|p| s.contains(&to_loose_string(p)))
            })
            .register("isJSON", is_json)
            .register("isISO8601", is_iso8601)
            .register("isDate", is_date);
        library
    }

    /// Register (or replace) a predicate under `name`
    pub fn register<F>(&mut self, name: impl Into<String>, predicate: F) -> &mut Self
    where
        F: Fn(&str, &[Value]) -> bool + Send + Sync + 'static,
    {
        self.predicates.insert(name.into(), Arc::new(predicate));
        self
    }

    /// Get a predicate by name
    pub fn get(&self, name: &str) -> Option<&Predicate> {
        self.predicates.get(name)
    }

    /// Check whether a predicate exists
    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    /// Names of all registered predicates
    pub fn names(&self) -> Vec<&str> {
        self.predicates.keys().map(String::as_str).collect()
    }
}

// =============================================================================
// Option helpers
// =============================================================================

/// Read `key` from an options object passed as the first parameter
fn option<'a>(params: &'a [Value], key: &str) -> Option<&'a Value> {
    params.first()?.as_object()?.get(key)
}

fn number_option(params: &[Value], key: &str) -> Option<f64> {
    match option(params, key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn flag_option(params: &[Value], key: &str) -> Option<bool> {
    option(params, key)?.as_bool()
}

/// Check `min`/`max`/`gt`/`lt` options against a parsed number
fn within_bounds(number: f64, params: &[Value]) -> bool {
    number_option(params, "min").is_none_or(|min| number >= min)
        && number_option(params, "max").is_none_or(|max| number <= max)
        && number_option(params, "gt").is_none_or(|gt| number > gt)
        && number_option(params, "lt").is_none_or(|lt| number < lt)
}

// =============================================================================
// Predicates
// =============================================================================

fn is_int(s: &str, params: &[Value]) -> bool {
    static INT: OnceLock<Regex> = OnceLock::new();
    static INT_NO_LEADING_ZEROES: OnceLock<Regex> = OnceLock::new();

    let regex = if flag_option(params, "allow_leading_zeroes") == Some(false) {
        INT_NO_LEADING_ZEROES.get_or_init(|| Regex::new(r"^[-+]?(?:[1-9][0-9]*|0)$").unwrap())
    } else {
        INT.get_or_init(|| Regex::new(r"^[-+]?[0-9]+$").unwrap())
    };

    regex.is_match(s) && s.parse::<f64>().is_ok_and(|n| within_bounds(n, params))
}

fn is_float(s: &str, params: &[Value]) -> bool {
    static FLOAT: OnceLock<Regex> = OnceLock::new();
    let regex = FLOAT.get_or_init(|| {
        Regex::new(r"^[-+]?(?:[0-9]+)?(?:\.[0-9]*)?(?:[eE][-+]?[0-9]+)?$").unwrap()
    });

    if matches!(s, "" | "." | "-" | "+" | "-." | "+.") || !regex.is_match(s) {
        return false;
    }
    s.parse::<f64>().is_ok_and(|n| within_bounds(n, params))
}

fn is_numeric(s: &str, _: &[Value]) -> bool {
    static NUMERIC: OnceLock<Regex> = OnceLock::new();
    let regex = NUMERIC.get_or_init(|| Regex::new(r"^[-+]?(?:[0-9]*\.)?[0-9]+$").unwrap());
    regex.is_match(s)
}

fn is_boolean(s: &str, params: &[Value]) -> bool {
    if flag_option(params, "loose") == Some(true) {
        let lowered = s.to_lowercase();
        matches!(lowered.as_str(), "true" | "false" | "1" | "0" | "yes" | "no")
    } else {
        matches!(s, "true" | "false" | "1" | "0")
    }
}

fn is_ip(s: &str, params: &[Value]) -> bool {
    let version = params.first().map(to_loose_string);
    match version.as_deref() {
        Some("4") => s.to_owned().validate_ipv4(),
        Some("6") => s.to_owned().validate_ipv6(),
        _ => s.to_owned().validate_ip(),
    }
}

fn is_uuid(s: &str, params: &[Value]) -> bool {
    let Ok(uuid) = Uuid::parse_str(s) else {
        return false;
    };
    // Only the hyphenated form is accepted
    if s.len() != 36 {
        return false;
    }
    match params.first().map(to_loose_string).as_deref() {
        None | Some("all") => true,
        Some(version) => version
            .parse::<usize>()
            .is_ok_and(|v| uuid.get_version_num() == v),
    }
}

fn is_length(s: &str, params: &[Value]) -> bool {
    let len = s.chars().count() as f64;
    let (min, max) = match params.first() {
        Some(Value::Object(_)) => (
            number_option(params, "min").unwrap_or(0.0),
            number_option(params, "max"),
        ),
        // Positional form: isLength(str, min, max)
        Some(min) => (
            min.as_f64().unwrap_or(0.0),
            params.get(1).and_then(Value::as_f64),
        ),
        None => (0.0, None),
    };
    len >= min && max.is_none_or(|max| len <= max)
}

fn is_empty(s: &str, params: &[Value]) -> bool {
    if flag_option(params, "ignore_whitespace") == Some(true) {
        s.trim().is_empty()
    } else {
        s.is_empty()
    }
}

fn is_in(s: &str, params: &[Value]) -> bool {
    match params.first() {
        Some(Value::Array(options)) => options.iter().any(|o| to_loose_string(o) == s),
        Some(Value::Object(options)) => options.contains_key(s),
        Some(Value::String(options)) => options.contains(s),
        _ => false,
    }
}

fn matches_pattern(s: &str, params: &[Value]) -> bool {
    let Some(pattern) = params.first().and_then(Value::as_str) else {
        return false;
    };
    let flags = params.get(1).and_then(Value::as_str).unwrap_or_default();
    RegexBuilder::new(pattern)
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .build()
        .is_ok_and(|regex| regex.is_match(s))
}

fn is_json(s: &str, params: &[Value]) -> bool {
    match serde_json::from_str::<Value>(s) {
        Ok(Value::Object(_) | Value::Array(_)) => true,
        Ok(Value::Null) | Err(_) => false,
        Ok(_) => flag_option(params, "allow_primitives") == Some(true),
    }
}

fn is_iso8601(s: &str, _: &[Value]) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
        || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
}

fn is_date(s: &str, params: &[Value]) -> bool {
    let format = match params.first() {
        Some(Value::String(format)) => format.clone(),
        Some(Value::Object(_)) => option(params, "format")
            .and_then(Value::as_str)
            .unwrap_or("YYYY/MM/DD")
            .to_string(),
        _ => "YYYY/MM/DD".to_string(),
    };
    let pattern = format
        .replace("YYYY", "%Y")
        .replace("MM", "%m")
        .replace("DD", "%d");

    // Both delimiters are accepted whichever one the format uses
    [pattern.clone(), pattern.replace('/', "-"), pattern.replace('-', "/")]
        .iter()
        .any(|p| NaiveDate::parse_from_str(s, p).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(name: &str, value: &str, params: &[Value]) -> bool {
        let library = PredicateLibrary::builtin();
        let predicate = library.get(name).expect("builtin predicate");
        predicate(value, params)
    }

    #[test]
    fn test_builtin_registers_common_names() {
        let library = PredicateLibrary::builtin();
        for name in ["isInt", "isFloat", "isBoolean", "isEmail", "isLength", "matches"] {
            assert!(library.contains(name), "{name} missing");
        }
        assert!(!library.contains("isOptional"));
    }

    #[test]
    fn test_register_custom_predicate() {
        let mut library = PredicateLibrary::new();
        library.register("isEven", |s, _| s.parse::<i64>().is_ok_and(|n| n % 2 == 0));
        let predicate = library.get("isEven").unwrap();
        assert!(predicate("4", &[]));
        assert!(!predicate("5", &[]));
    }

    // === isInt ===

    #[test]
    fn test_is_int() {
        assert!(check("isInt", "42", &[]));
        assert!(check("isInt", "-7", &[]));
        assert!(check("isInt", "007", &[]));
        assert!(!check("isInt", "abc", &[]));
        assert!(!check("isInt", "4.2", &[]));
        assert!(!check("isInt", "", &[]));
    }

    #[test]
    fn test_is_int_bounds_and_leading_zeroes() {
        let bounds = [json!({"min": 1, "max": 10})];
        assert!(check("isInt", "10", &bounds));
        assert!(!check("isInt", "11", &bounds));
        assert!(!check("isInt", "0", &bounds));
        assert!(!check("isInt", "007", &[json!({"allow_leading_zeroes": false})]));
    }

    // === isFloat / isNumeric ===

    #[test]
    fn test_is_float() {
        assert!(check("isFloat", "3.14", &[]));
        assert!(check("isFloat", "3", &[]));
        assert!(check("isFloat", ".5", &[]));
        assert!(check("isFloat", "1e3", &[]));
        assert!(!check("isFloat", ".", &[]));
        assert!(!check("isFloat", "3.1.4", &[]));
        assert!(!check("isFloat", "2.5", &[json!({"max": 2})]));
    }

    #[test]
    fn test_is_numeric() {
        assert!(check("isNumeric", "12.5", &[]));
        assert!(!check("isNumeric", "12a", &[]));
    }

    // === isBoolean ===

    #[test]
    fn test_is_boolean_strict_and_loose() {
        assert!(check("isBoolean", "true", &[]));
        assert!(check("isBoolean", "0", &[]));
        assert!(!check("isBoolean", "yes", &[]));
        assert!(check("isBoolean", "Yes", &[json!({"loose": true})]));
    }

    // === formats ===

    #[test]
    fn test_is_email() {
        assert!(check("isEmail", "ana@example.com", &[]));
        assert!(!check("isEmail", "ana-at-example", &[]));
    }

    #[test]
    fn test_is_url() {
        assert!(check("isURL", "https://example.com/a?b=c", &[]));
        assert!(!check("isURL", "not a url", &[]));
    }

    #[test]
    fn test_is_ip_versions() {
        assert!(check("isIP", "10.0.0.1", &[]));
        assert!(check("isIP", "::1", &[json!(6)]));
        assert!(!check("isIP", "::1", &[json!(4)]));
    }

    #[test]
    fn test_is_uuid() {
        let v4 = "936da01f-9abd-4d9d-80c7-02af85c822a8";
        assert!(check("isUUID", v4, &[]));
        assert!(check("isUUID", v4, &[json!(4)]));
        assert!(!check("isUUID", v4, &[json!(1)]));
        assert!(!check("isUUID", "936da01f9abd4d9d80c702af85c822a8", &[]));
    }

    #[test]
    fn test_is_length_object_and_positional() {
        assert!(check("isLength", "abc", &[json!({"min": 2, "max": 3})]));
        assert!(!check("isLength", "abcd", &[json!({"min": 2, "max": 3})]));
        assert!(check("isLength", "héllo", &[json!(5), json!(5)]));
        assert!(!check("isLength", "a", &[json!(2)]));
    }

    #[test]
    fn test_is_in() {
        let options = [json!(["red", "green", 3])];
        assert!(check("isIn", "green", &options));
        assert!(check("isIn", "3", &options));
        assert!(!check("isIn", "blue", &options));
    }

    #[test]
    fn test_matches_with_flags() {
        assert!(check("matches", "ABC", &[json!("^abc$"), json!("i")]));
        assert!(!check("matches", "ABC", &[json!("^abc$")]));
        assert!(!check("matches", "abc", &[json!("(")]));
        assert!(!check("matches", "abc", &[]));
    }

    #[test]
    fn test_equals_and_contains() {
        assert!(check("equals", "5", &[json!(5)]));
        assert!(check("contains", "foobar", &[json!("oba")]));
        assert!(!check("contains", "foobar", &[json!("baz")]));
    }

    #[test]
    fn test_is_json() {
        assert!(check("isJSON", r#"{"a":1}"#, &[]));
        assert!(!check("isJSON", "1", &[]));
        assert!(check("isJSON", "1", &[json!({"allow_primitives": true})]));
        assert!(!check("isJSON", "null", &[json!({"allow_primitives": true})]));
    }

    #[test]
    fn test_dates() {
        assert!(check("isISO8601", "2024-01-15", &[]));
        assert!(check("isISO8601", "2024-01-15T10:00:00Z", &[]));
        assert!(!check("isISO8601", "15/01/2024", &[]));
        assert!(check("isDate", "2024/01/15", &[]));
        assert!(check("isDate", "2024-01-15", &[]));
        assert!(check("isDate", "15/01/2024", &[json!("DD/MM/YYYY")]));
        assert!(!check("isDate", "2024/13/01", &[]));
    }

    #[test]
    fn test_case_predicates() {
        assert!(check("isLowercase", "abc1", &[]));
        assert!(!check("isUppercase", "aBC", &[]));
        assert!(check("isAlpha", "abc", &[]));
        assert!(!check("isAlphanumeric", "ab c", &[]));
        assert!(check("isEmpty", "  ", &[json!({"ignore_whitespace": true})]));
    }
}
