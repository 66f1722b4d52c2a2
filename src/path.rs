// Copy-on-write value assignment at a dot path

use crate::error::PathError;
use serde_json::{Map, Value};
use tracing::debug;

/// What to do when a path runs through a value that is not an object
///
/// Missing and null intermediates are always replaced by an empty object; the
/// policy only decides the fate of strings, numbers, booleans and arrays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Intermediate {
    /// Replace the value with an empty object and keep walking
    #[default]
    Overwrite,
    /// Fail with `PathError::NotAnObject`
    Reject,
}

/// Set `value` at the dot-separated `path` inside `record`
///
/// Returns a new record. The input is never mutated: every object along the
/// path is rebuilt and untouched siblings are carried over. Missing
/// intermediate keys are created as empty objects.
pub fn set_nested_value(record: &Value, path: &str, value: Value) -> Result<Value, PathError> {
    set_nested_value_with(record, path, value, Intermediate::Overwrite)
}

/// Same as [`set_nested_value`] with an explicit policy for non-object intermediates
pub fn set_nested_value_with(
    record: &Value,
    path: &str,
    value: Value,
    policy: Intermediate,
) -> Result<Value, PathError> {
    let keys = split_path(path)?;
    debug!(path, depth = keys.len(), "set_nested_value: called");
    assign(record, &keys, 0, value, policy)
}

/// Split a dot path into its segments, rejecting empty ones
pub fn split_path(path: &str) -> Result<Vec<&str>, PathError> {
    if path.is_empty() {
        return Err(PathError::EmptyPath);
    }
    let keys: Vec<&str> = path.split('.').collect();
    if keys.iter().any(|k| k.is_empty()) {
        return Err(PathError::EmptySegment { path: path.to_string() });
    }
    Ok(keys)
}

fn assign(current: &Value, keys: &[&str], depth: usize, value: Value, policy: Intermediate) -> Result<Value, PathError> {
    let mut object = match current {
        Value::Object(map) => map.clone(),
        // Absent and null keys are created under either policy
        Value::Null => Map::new(),
        _ if policy == Intermediate::Overwrite => Map::new(),
        _ => {
            return Err(PathError::NotAnObject {
                path: keys[..depth].join("."),
            });
        }
    };

    let key = keys[depth];
    if depth + 1 == keys.len() {
        object.insert(key.to_string(), value);
    } else {
        let updated = match object.get(key) {
            Some(child) => assign(child, keys, depth + 1, value, policy)?,
            None => assign(&Value::Null, keys, depth + 1, value, policy)?,
        };
        object.insert(key.to_string(), updated);
    }

    Ok(Value::Object(object))
}

/// Kind of form input a raw value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Number,
    Checkbox,
}

/// Convert a raw form value into the JSON value stored in the record
///
/// Numbers that are empty or fail to parse become `null`; checkboxes are
/// true for "true", "on", "1" and "yes".
pub fn coerce_input(kind: InputKind, raw: &str) -> Value {
    match kind {
        InputKind::Text => Value::String(raw.to_string()),
        InputKind::Number => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        InputKind::Checkbox => Value::Bool(matches!(
            raw.trim().to_ascii_lowercase().as_str(),
            "true" | "on" | "1" | "yes"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_creates_missing_intermediates() {
        let result = set_nested_value(&json!({}), "a.b.c", json!(5)).unwrap();
        assert_eq!(result, json!({"a": {"b": {"c": 5}}}));
    }

    #[test]
    fn test_preserves_siblings() {
        let record = json!({"a": {"b": 1, "keep": true}, "other": "x"});
        let result = set_nested_value(&record, "a.b", json!(2)).unwrap();
        assert_eq!(result, json!({"a": {"b": 2, "keep": true}, "other": "x"}));
    }

    #[test]
    fn test_input_is_not_mutated() {
        let record = json!({"pricing": {"discountType": "none"}});
        let result = set_nested_value(&record, "pricing.discountType", json!("percent")).unwrap();

        assert_eq!(record["pricing"]["discountType"], json!("none"));
        assert_eq!(result["pricing"]["discountType"], json!("percent"));
    }

    #[test]
    fn test_null_value_is_stored() {
        let result = set_nested_value(&json!({"pricing": {"price": 3}}), "pricing.price", Value::Null).unwrap();
        assert_eq!(result, json!({"pricing": {"price": null}}));
    }

    #[test]
    fn test_overwrites_scalar_intermediate() {
        let record = json!({"pricing": 10});
        let result = set_nested_value(&record, "pricing.price", json!(12)).unwrap();
        assert_eq!(result, json!({"pricing": {"price": 12}}));
    }

    #[test]
    fn test_reject_policy_keeps_scalar_intermediate() {
        let record = json!({"pricing": 10});
        let err = set_nested_value_with(&record, "pricing.price", json!(12), Intermediate::Reject).unwrap_err();
        assert_eq!(
            err,
            PathError::NotAnObject {
                path: "pricing".to_string()
            }
        );
    }

    #[test]
    fn test_reject_policy_allows_missing_keys() {
        let result = set_nested_value_with(&json!({}), "shipping.weight", json!(1.5), Intermediate::Reject).unwrap();
        assert_eq!(result, json!({"shipping": {"weight": 1.5}}));
    }

    #[test]
    fn test_non_object_root() {
        assert_eq!(set_nested_value(&json!([1, 2]), "a", json!(1)).unwrap(), json!({"a": 1}));

        let err = set_nested_value_with(&json!("text"), "a", json!(1), Intermediate::Reject).unwrap_err();
        assert_eq!(err, PathError::NotAnObject { path: String::new() });
    }

    #[test]
    fn test_empty_paths_are_rejected() {
        assert_eq!(set_nested_value(&json!({}), "", json!(1)).unwrap_err(), PathError::EmptyPath);
        assert!(matches!(
            set_nested_value(&json!({}), "a..b", json!(1)),
            Err(PathError::EmptySegment { .. })
        ));
        assert!(matches!(
            set_nested_value(&json!({}), "a.", json!(1)),
            Err(PathError::EmptySegment { .. })
        ));
    }

    #[test]
    fn test_coerce_input() {
        assert_eq!(coerce_input(InputKind::Text, "Shirt"), json!("Shirt"));
        assert_eq!(coerce_input(InputKind::Number, "12.5"), json!(12.5));
        assert_eq!(coerce_input(InputKind::Number, ""), Value::Null);
        assert_eq!(coerce_input(InputKind::Number, "abc"), Value::Null);
        assert_eq!(coerce_input(InputKind::Checkbox, "on"), json!(true));
        assert_eq!(coerce_input(InputKind::Checkbox, "false"), json!(false));
    }
}
