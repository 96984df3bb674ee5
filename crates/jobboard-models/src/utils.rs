//! Lenient parsing helpers for query strings and loosely-typed JSON bodies.

use chrono::{SecondsFormat, Utc};
use serde_json::Value;

/// Parse the leading integer of a string, ignoring anything after it.
///
/// Leading whitespace and a single sign are accepted. Returns `None` when no
/// digit follows. Values outside `i64` saturate.
///
/// ```
/// use jobboard_models::parse_int_prefix;
///
/// assert_eq!(parse_int_prefix(" 12abc"), Some(12));
/// assert_eq!(parse_int_prefix("-3"), Some(-3));
/// assert_eq!(parse_int_prefix("abc"), None);
/// ```
pub fn parse_int_prefix(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let digits = &rest[..digits_len];
    let value = match digits.parse::<i64>() {
        Ok(v) => v,
        Err(_) => i64::MAX,
    };

    Some(if negative { value.saturating_neg() } else { value })
}

/// Coerce a loosely-typed JSON value to a finite number.
///
/// Numbers pass through, booleans become 0/1, null and blank strings become 0,
/// other strings are parsed as decimals. Anything else (or a non-finite
/// result) yields `None`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Null => 0.0,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().ok()?
            }
        }
        Value::Array(_) | Value::Object(_) => return None,
    };

    number.is_finite().then_some(number)
}

/// Current UTC time as an RFC 3339 string with millisecond precision.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
