use serde_json::{Number, Value};
use std::cmp::Ordering;

/// Loose equality between a document value and a query operand.
///
/// - numbers compare numerically
/// - a string against a number or boolean compares after numeric coercion,
///   a blank string coercing to `0`
/// - booleans coerce to `1` and `0` against numbers
/// - `null` equals only `null`
/// - arrays and objects compare structurally with their own kind, and an
///   array against a scalar compares its comma-joined text
pub(crate) fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => number_eq(a, b),
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => left == right,
        (Value::Array(items), scalar) | (scalar, Value::Array(items)) if is_scalar(scalar) => {
            loose_eq(&Value::String(join_text(items)), scalar)
        }
        (Value::Array(_), _) | (_, Value::Array(_)) => false,
        (Value::Object(_), _) | (_, Value::Object(_)) => false,
        _ => match (to_number(left), to_number(right)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

/// Orders a document value against a query operand.
///
/// Both sides numeric (numbers, booleans or numeric strings): numeric order.
/// Otherwise both strings: lexicographic order. Anything else is unordered.
pub(crate) fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    if let (Value::Number(a), Value::Number(b)) = (left, right) {
        return number_cmp(a, b);
    }

    match (to_number(left), to_number(right)) {
        (Some(a), Some(b)) => a.partial_cmp(&b),
        _ => match (left, right) {
            (Value::String(a), Value::String(b)) => Some(a.as_str().cmp(b.as_str())),
            _ => None,
        },
    }
}

/// Numeric coercion of a scalar. Arrays, objects and `null` have none.
fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Some(0.0);
            }
            trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
        }
        _ => None,
    }
}

fn number_eq(a: &Number, b: &Number) -> bool {
    number_cmp(a, b) == Some(Ordering::Equal)
}

fn number_cmp(a: &Number, b: &Number) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return Some(x.cmp(&y));
    }
    a.as_f64()?.partial_cmp(&b.as_f64()?)
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn join_text(items: &[Value]) -> String {
    items
        .iter()
        .map(|item| match item {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Array(inner) => join_text(inner),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(",")
}
