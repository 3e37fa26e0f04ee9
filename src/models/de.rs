//! Deserializers for fields that arrive as either JSON strings or numbers.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_string(value)
        .ok_or_else(|| serde::de::Error::custom("expected string or number, found null"))
}

pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_string))
}

/// Decimal reading of a string or number, `None` for anything else.
pub fn decimal_from_value(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_decimal_from_value_shapes() {
        assert_eq!(decimal_from_value(&json!("0.01")), Some(dec!(0.01)));
        assert_eq!(decimal_from_value(&json!(64000.5)), Some(dec!(64000.5)));
        assert_eq!(decimal_from_value(&json!(3)), Some(dec!(3)));
        assert_eq!(decimal_from_value(&json!(1e-7)), Some(dec!(0.0000001)));
        assert_eq!(decimal_from_value(&json!("")), None);
        assert_eq!(decimal_from_value(&json!(null)), None);
        assert_eq!(decimal_from_value(&json!([1])), None);
    }
}
