//! Loose value semantics shared by the resolver, rules and accessors
//!
//! Raw parameters are `serde_json::Value`s. Web frameworks hand them over with
//! scripting-language conventions attached (truthiness, `value + ""`
//! stringification, dotted path lookup), and the engine keeps those
//! conventions so declarations behave the same whichever source a value came
//! from.

use serde_json::{Map, Value};

/// Whether a value counts as present
///
/// `null`, `false`, `0`, and `""` are falsy; everything else (including empty
/// arrays and objects) is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Render a value the way string concatenation would
pub fn to_loose_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                // f64 Display already drops a trailing ".0"
                n.as_f64().map(|f| f.to_string()).unwrap_or_default()
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => to_loose_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Look up a dotted path (`"query.age"`, `"body.tags.0"`)
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Write `value` at `path`, creating intermediate objects as needed
///
/// Any non-object met along the way is replaced by an object.
pub fn assign(root: &mut Value, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };

    let mut current = root;
    for segment in parents {
        current = ensure_object(current)
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    ensure_object(current).insert(last.clone(), value);
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced by an object"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // === is_truthy() ===

    #[test]
    fn test_falsy_values() {
        for value in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!is_truthy(&value), "{value} should be falsy");
        }
    }

    #[test]
    fn test_truthy_values() {
        for value in [json!(true), json!(-1), json!("0"), json!("false"), json!([]), json!({})] {
            assert!(is_truthy(&value), "{value} should be truthy");
        }
    }

    // === to_loose_string() ===

    #[test]
    fn test_loose_string_scalars() {
        assert_eq!(to_loose_string(&json!("abc")), "abc");
        assert_eq!(to_loose_string(&json!(42)), "42");
        assert_eq!(to_loose_string(&json!(3.5)), "3.5");
        assert_eq!(to_loose_string(&json!(2.0)), "2");
        assert_eq!(to_loose_string(&json!(true)), "true");
        assert_eq!(to_loose_string(&json!(null)), "null");
    }

    #[test]
    fn test_loose_string_compound() {
        assert_eq!(to_loose_string(&json!([1, null, "a"])), "1,,a");
        assert_eq!(to_loose_string(&json!({"a": 1})), "[object Object]");
    }

    // === lookup() ===

    #[test]
    fn test_lookup_nested_and_indexed() {
        let root = json!({"query": {"age": "12"}, "body": {"tags": ["x", "y"]}});
        assert_eq!(lookup(&root, "query.age"), Some(&json!("12")));
        assert_eq!(lookup(&root, "body.tags.1"), Some(&json!("y")));
        assert_eq!(lookup(&root, "query.missing"), None);
        assert_eq!(lookup(&root, "query.age.deeper"), None);
    }

    // === assign() ===

    #[test]
    fn test_assign_creates_intermediate_objects() {
        let mut root = json!({});
        assign(&mut root, &["default".into(), "age".into()], json!(18));
        assert_eq!(root, json!({"default": {"age": 18}}));
    }

    #[test]
    fn test_assign_overwrites_existing_leaf() {
        let mut root = json!({"query": {"age": "18", "name": "bo"}});
        assign(&mut root, &["query".into(), "age".into()], json!(18));
        assert_eq!(root, json!({"query": {"age": 18, "name": "bo"}}));
    }

    #[test]
    fn test_assign_empty_path_is_noop() {
        let mut root = json!({"a": 1});
        assign(&mut root, &[], json!(2));
        assert_eq!(root, json!({"a": 1}));
    }
}
