//! Per-field coercion of loosely shaped JSON items.
//!
//! Each helper takes a list of accepted keys (snake_case first, then
//! aliases) and returns the first usable value. Wrong types read as absent.

use serde_json::{Map, Value};

pub type Object = Map<String, Value>;

/// First array stored under any of `keys`.
pub fn array<'a>(obj: &'a Object, keys: &[&str]) -> Option<&'a Vec<Value>> {
    keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_array))
}

/// Like [`array`] but an absent or mistyped field reads as empty.
pub fn items<'a>(obj: &'a Object, keys: &[&str]) -> &'a [Value] {
    array(obj, keys).map(Vec::as_slice).unwrap_or(&[])
}

/// Non-empty trimmed string; numbers are rendered as text.
pub fn text(obj: &Object, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match obj.get(*k)? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

pub fn text_or(obj: &Object, keys: &[&str], placeholder: &str) -> String {
    text(obj, keys).unwrap_or_else(|| placeholder.to_string())
}

/// String entries of an array. A non-array value reads as an empty list.
pub fn string_list(obj: &Object, keys: &[&str]) -> Vec<String> {
    let Some(values) = array(obj, keys) else {
        return Vec::new();
    };
    values
        .iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect()
}

/// Non-negative integer from a number or a numeric string.
pub fn count(obj: &Object, keys: &[&str]) -> Option<u32> {
    keys.iter().find_map(|k| match obj.get(*k)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => super::sections::leading_number(s),
        _ => None,
    })
}

/// Explicit `id`, else `"<kind>-<index>"`.
pub fn id_or(obj: &Object, kind: &str, index: usize) -> String {
    text(obj, &["id"]).unwrap_or_else(|| format!("{kind}-{index}"))
}
