//! Value coercions applied once a field has passed its rules
//!
//! These mirror how loosely typed request values are usually turned into
//! numbers: parse the longest numeric prefix and ignore the rest.

use regex::Regex;
use serde_json::{Number, Value};
use std::sync::OnceLock;

use crate::core::value::{is_truthy, to_loose_string};

/// Which coercion a rule name selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    Int,
    Float,
    Boolean,
}

impl Coercion {
    /// The coercion triggered by a rule name, if any
    pub fn for_rule(name: &str) -> Option<Self> {
        match name {
            "isInt" => Some(Coercion::Int),
            "isFloat" => Some(Coercion::Float),
            "isBoolean" => Some(Coercion::Boolean),
            _ => None,
        }
    }

    /// Apply the coercion
    pub fn apply(self, value: &Value) -> Value {
        match self {
            Coercion::Int => parse_int(value),
            Coercion::Float => parse_float(value),
            Coercion::Boolean => Value::Bool(is_truthy(value)),
        }
    }
}

/// Parse a leading base-10 integer; `null` when there is none
pub fn parse_int(value: &Value) -> Value {
    let text = to_loose_string(value);
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if digits.is_empty() {
        return Value::Null;
    }

    match digits.parse::<i64>() {
        Ok(n) => Value::from(if negative { -n } else { n }),
        // Too large for i64: keep the magnitude as a float
        Err(_) => digits
            .parse::<f64>()
            .ok()
            .and_then(|f| Number::from_f64(if negative { -f } else { f }))
            .map_or(Value::Null, Value::Number),
    }
}

/// Parse a leading decimal number; `null` when there is none
pub fn parse_float(value: &Value) -> Value {
    static FLOAT_PREFIX: OnceLock<Regex> = OnceLock::new();
    let regex = FLOAT_PREFIX.get_or_init(|| {
        Regex::new(r"^[-+]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][-+]?[0-9]+)?").unwrap()
    });

    let text = to_loose_string(value);
    regex
        .find(text.trim_start())
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .and_then(Number::from_f64)
        .map_or(Value::Null, Value::Number)
}
