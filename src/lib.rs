//! Volatile Store - namespaced, versioned, TTL-bounded caching
//!
//! An insertion-ordered bounded store plus an expiring cache layered over
//! pluggable key/value backends, with an optional HTTP front end.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{BoundedStore, CacheOptions, ExpiringCache, Storage};
pub use config::Config;
pub use error::{CacheError, Result};
