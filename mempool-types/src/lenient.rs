//! Field decoders that never fail on a type mismatch.
//!
//! The upstream API is not consistent about number encoding: reward totals are
//! sent as decimal strings, fee rates as numbers. Each helper here accepts
//! either form and maps anything else (null, bool, objects, garbage strings)
//! to `None`. Use them with `#[serde(default, deserialize_with = "...")]` so a
//! missing key also ends up as `None`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode an unsigned integer from a JSON number or numeric string.
pub fn u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_u64(&value))
}

/// Decode a float from a JSON number or numeric string.
pub fn f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_f64(&value))
}

/// Decode a JSON string.
pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// Decode an array of strings. Non-string elements are skipped.
pub fn strings<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        )),
        _ => Ok(None),
    }
}

/// Decode a nested record, yielding `None` unless the value is an object.
pub fn object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => Ok(serde_json::from_value(value).ok()),
        _ => Ok(None),
    }
}

/// Interpret a JSON value as an unsigned integer.
pub fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Interpret a JSON value as a float.
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_strings_are_accepted() {
        assert_eq!(value_as_u64(&json!("14400000000")), Some(14_400_000_000));
        assert_eq!(value_as_f64(&json!(" 2.5 ")), Some(2.5));
    }

    #[test]
    fn mismatched_types_become_none() {
        assert_eq!(value_as_u64(&json!(true)), None);
        assert_eq!(value_as_u64(&json!(-3)), None);
        assert_eq!(value_as_u64(&json!(1.5)), None);
        assert_eq!(value_as_f64(&json!({"a": 1})), None);
        assert_eq!(value_as_f64(&json!("NaN")), None);
    }

    #[test]
    fn whole_floats_convert_to_integers() {
        assert_eq!(value_as_u64(&json!(840000.0)), Some(840_000));
    }
}
