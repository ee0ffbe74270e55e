//! Envelope Module
//!
//! Defines the serialized wrapper stored per logical cache entry.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// == Envelope ==
/// Wrapper persisted for every logical entry.
///
/// The short field names are the on-disk shape: `{"x": value, "t": stored_at, "v": version}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// The stored value
    #[serde(rename = "x")]
    pub value: T,
    /// Creation timestamp (Unix milliseconds)
    #[serde(rename = "t")]
    pub stored_at: u64,
    /// Schema tag the entry was written under
    #[serde(rename = "v", default)]
    pub version: Option<String>,
}

impl<T> Envelope<T> {
    // == Constructor ==
    /// Wraps a value stamped with the current time.
    pub fn new(value: T, version: Option<String>) -> Self {
        Self {
            value,
            stored_at: current_timestamp_ms(),
            version,
        }
    }

    // == Is Valid ==
    /// Checks the entry against the cache's TTL and schema tag.
    ///
    /// Boundary condition: once `max_age` milliseconds have fully elapsed the
    /// entry is expired. `None` means the entry never expires by age.
    pub fn is_valid(&self, max_age: Option<u64>, version: Option<&str>) -> bool {
        let fresh = match max_age {
            Some(max_age) => current_timestamp_ms().saturating_sub(self.stored_at) < max_age,
            None => true,
        };

        fresh && self.version.as_deref() == version
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
