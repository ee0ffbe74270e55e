//! Request DTOs for the cache HTTP API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

/// Request body for the SET operation (PUT /set)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// Any JSON value to store
    pub value: Value,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        None
    }
}

/// Request body for runtime reconfiguration (PUT /config)
///
/// Omitted fields are left unchanged. A present field that is not a number
/// (`null`, a string, ...) resets that limit to unbounded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigRequest {
    #[serde(default, deserialize_with = "present")]
    pub capacity: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub max_age: Option<Value>,
}

/// Keeps an explicit `null` as `Some(Value::Null)` so it is distinguishable from omission.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Interprets a JSON limit: numbers are used (negatives clamp to 0), anything
/// else means unbounded.
pub fn limit_from_json(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|i| i.max(0) as u64))
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.max(0.0) as u64)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_request_deserialize() {
        let json = r#"{"key": "card", "value": {"html": "<div></div>"}}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.key, "card");
        assert_eq!(req.value, json!({"html": "<div></div>"}));
    }

    #[test]
    fn test_validate_empty_key() {
        let req = SetRequest {
            key: "".to_string(),
            value: json!(1),
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_valid_request() {
        let req = SetRequest {
            key: "valid_key".to_string(),
            value: json!("test"),
        };
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_config_request_distinguishes_null_from_missing() {
        let req: ConfigRequest = serde_json::from_str(r#"{"capacity": null}"#).unwrap();
        assert_eq!(req.capacity, Some(Value::Null));
        assert_eq!(req.max_age, None);
    }

    #[test]
    fn test_limit_from_json() {
        assert_eq!(limit_from_json(&json!(5)), Some(5));
        assert_eq!(limit_from_json(&json!(-3)), Some(0));
        assert_eq!(limit_from_json(&json!(1.5)), Some(1));
        assert_eq!(limit_from_json(&json!("5")), None);
        assert_eq!(limit_from_json(&Value::Null), None);
    }
}
