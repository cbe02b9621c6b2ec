//! Loose value coercions for launch configuration fields.
//!
//! Launch configurations come from JSON props, query strings and feed items,
//! so a numeric field may arrive as a number, a numeric string or garbage.
//! These helpers define exactly which inputs count as what.

use serde_json::Value;

/// Reads a leading integer from a JSON value.
///
/// - Numbers are truncated toward zero (`90.7` -> `90`).
/// - Strings are trimmed, then an optional sign and the leading decimal
///   digits are read (`" 90deg"` -> `90`). No digits means no number.
/// - Booleans, null, arrays and objects are never numeric.
///
/// Values outside the `i64` range are treated as non-numeric.
pub fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            let f = n.as_f64()?;
            if f.is_finite() && f.abs() < i64::MAX as f64 {
                Some(f.trunc() as i64)
            } else {
                None
            }
        }
        Value::String(s) => parse_int_prefix(s),
        _ => None,
    }
}

fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Whether a value counts as "not set" for optional numeric selectors.
///
/// `null`, `false`, `0` and the empty string all mean the field was left
/// blank; such values fall back to the default without a warning.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Strict boolean flag: only the JSON boolean `true` enables a flag.
pub fn is_true(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}

/// Compact rendering of a raw value for log lines.
pub fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
