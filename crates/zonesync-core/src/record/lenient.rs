//! Lenient scalar decoding for panel and provider payloads
//!
//! Panels and provider APIs mix strings and numbers for the same field
//! (`"ttl": "3600"` vs `"ttl": 3600`). These helpers accept both and treat
//! `null` and the empty string as absent.

use super::RecordType;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode an optional string, accepting numbers and booleans as text
pub fn optional_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Decode a string that defaults to empty
pub fn string_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(optional_string(deserializer)?.unwrap_or_default())
}

/// Decode an optional non-negative integer from a number or numeric string
pub fn optional_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(value_to_u32))
}

/// Decode an optional record type; empty means "no type"
pub fn optional_record_type<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<RecordType>, D::Error> {
    Ok(optional_string(deserializer)?
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<RecordType>().unwrap_or_else(|never| match never {})))
}

/// Interpret a JSON scalar as a non-negative integer
pub fn value_to_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(|v| v.min(u64::from(u32::MAX)) as u32)
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u32)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Interpret a JSON scalar as an opaque identifier
pub fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Leading-integer conversion of free text
///
/// Takes the optional sign and the run of digits at the start of the trimmed
/// text; anything else yields 0. `"10"` is 10, `"10 20 5060"` is 10,
/// `"issue"` is 0.
pub fn leading_int(text: &str) -> u32 {
    let trimmed = text.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if unsigned.starts_with('-') {
        return 0;
    }
    let digits: String = unsigned.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u32::MAX)
}

/// Parse a token that must be numeric as a whole
///
/// Fractional values truncate toward zero; negative values clamp to 0.
pub fn numeric_token(token: &str) -> Option<u32> {
    let token = token.trim();
    if let Ok(v) = token.parse::<u32>() {
        return Some(v);
    }
    token
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.max(0.0).min(f64::from(u32::MAX)) as u32)
}
