//! Configuration Module
//!
//! Handles loading cache and server configuration from environment variables.

use std::env;
use std::path::PathBuf;

use crate::cache::CacheOptions;

/// Server and cache configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Namespace prefix for cache keys
    pub namespace: Option<String>,
    /// Schema tag stamped on every entry
    pub version: Option<String>,
    /// Maximum number of logical entries, None = unbounded
    pub capacity: Option<usize>,
    /// Maximum entry age in milliseconds, None = unbounded
    pub max_age: Option<u64>,
    /// Backing file for persistent storage, None = in-memory
    pub storage_path: Option<PathBuf>,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_NAMESPACE` - Key prefix (default: none)
    /// - `CACHE_VERSION` - Schema tag (default: none)
    /// - `CACHE_CAPACITY` - Maximum entries (default: unbounded)
    /// - `CACHE_MAX_AGE` - Entry lifetime in milliseconds (default: unbounded)
    /// - `CACHE_STORAGE` - Path of a JSON file to persist into (default: in-memory)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            namespace: text("CACHE_NAMESPACE"),
            version: text("CACHE_VERSION"),
            capacity: lookup("CACHE_CAPACITY")
                .and_then(|v| parse_limit(&v))
                .map(|n| usize::try_from(n).unwrap_or(usize::MAX)),
            max_age: lookup("CACHE_MAX_AGE").and_then(|v| parse_limit(&v)),
            storage_path: text("CACHE_STORAGE").map(PathBuf::from),
            server_port: lookup("SERVER_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
        }
    }

    /// Cache options for this configuration, minus the storage backend.
    pub fn cache_options(&self) -> CacheOptions {
        CacheOptions {
            storage: None,
            ns: self.namespace.clone(),
            version: self.version.clone(),
            capacity: self.capacity,
            max_age: self.max_age,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: None,
            version: None,
            capacity: None,
            max_age: None,
            storage_path: None,
            server_port: 3000,
        }
    }
}

/// Parses a capacity or age limit.
///
/// Integers are taken as-is and negative integers clamp to 0. Anything
/// non-numeric means unbounded (`None`).
pub fn parse_limit(raw: &str) -> Option<u64> {
    let raw = raw.trim();

    if let Ok(n) = raw.parse::<i64>() {
        return Some(n.max(0) as u64);
    }

    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(n.max(0.0) as u64),
        _ => None,
    }
}
