//! Cache Module
//!
//! Bounded insertion-ordered storage and a namespaced, versioned, TTL-bounded
//! cache layered over pluggable backends.

mod backend;
mod bounded;
mod envelope;
mod expiring;
mod stats;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use backend::{Backend, BulkBackend, FileBackend, IndexedBackend, MemoryBackend, Storage};
pub use bounded::BoundedStore;
pub use envelope::{current_timestamp_ms, Envelope};
pub use expiring::{CacheOptions, ExpiringCache, SWEEP_DELAY};
pub use stats::CacheStats;
