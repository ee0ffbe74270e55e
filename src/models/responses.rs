//! Response DTOs for the cache HTTP API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Value,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Acknowledgement for SET, DELETE and CLEAR
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    /// Success message
    pub message: String,
    /// The key acted on, absent for CLEAR
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl MessageResponse {
    pub fn set(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key: Some(key),
        }
    }

    pub fn deleted(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key: Some(key),
        }
    }

    pub fn cleared() -> Self {
        Self {
            message: "Storage cleared".to_string(),
            key: None,
        }
    }
}

/// Response body for GET /keys
#[derive(Debug, Clone, Serialize)]
pub struct KeysResponse {
    pub keys: Vec<String>,
}

/// Current limits, returned by PUT /config
#[derive(Debug, Clone, Serialize)]
pub struct ConfigResponse {
    /// None = unbounded
    pub capacity: Option<usize>,
    /// Milliseconds, None = unbounded
    pub max_age: Option<u64>,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
    pub evictions: u64,
    pub sweeps: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            invalidations: stats.invalidations,
            evictions: stats.evictions,
            sweeps: stats.sweeps,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_response_serialize() {
        let resp = GetResponse::new("card", json!({"html": "<p>"}));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json, json!({"key": "card", "value": {"html": "<p>"}}));
    }

    #[test]
    fn test_message_responses() {
        let set = serde_json::to_string(&MessageResponse::set("my_key")).unwrap();
        assert!(set.contains("my_key"));
        assert!(set.contains("successfully"));

        let cleared = serde_json::to_value(MessageResponse::cleared()).unwrap();
        assert!(cleared.get("key").is_none());
    }

    #[test]
    fn test_stats_response_from_stats() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            invalidations: 1,
            evictions: 2,
            sweeps: 4,
        };
        let resp = StatsResponse::from(stats);
        assert!((resp.hit_rate - 0.75).abs() < 0.001);
        assert_eq!(resp.evictions, 2);
    }

    #[test]
    fn test_config_response_unbounded_is_null() {
        let resp = ConfigResponse {
            capacity: None,
            max_age: Some(10),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json, json!({"capacity": null, "max_age": 10}));
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
