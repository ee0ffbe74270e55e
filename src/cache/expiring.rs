//! Expiring Cache Module
//!
//! Namespaced, versioned, TTL-bounded cache over a pluggable [`Storage`] backend.
//!
//! Every logical entry is wrapped in an [`Envelope`] and stored as JSON under
//! `namespace + key`. Expiry is enforced lazily on every read and proactively
//! by a debounced sweep scheduled after every mutation.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, Envelope, Storage};
use crate::error::Result;
use crate::tasks::Debouncer;

/// Delay between the last mutation and the sweep it schedules.
pub const SWEEP_DELAY: Duration = Duration::from_millis(50);

// == Options ==
/// Construction options. Every field is optional.
#[derive(Debug, Default, Clone)]
pub struct CacheOptions {
    /// Backend to delegate to; an unbounded in-memory store when None
    pub storage: Option<Storage>,
    /// Namespace prefix; keys are stored as `"{ns}.{key}"`
    pub ns: Option<String>,
    /// Schema tag entries must carry to be valid
    pub version: Option<String>,
    /// Max number of logical entries, None = unbounded
    pub capacity: Option<usize>,
    /// Max entry age in milliseconds, None = unbounded
    pub max_age: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Limits {
    capacity: Option<usize>,
    max_age: Option<u64>,
}

/// Outcome of reading one entry.
enum Lookup {
    Hit(Value),
    /// Absent, null or not JSON at all
    Miss,
    /// Parsed, but not an envelope, expired or written under another version
    Invalid,
}

// == Expiring Cache ==
/// Cheaply cloneable handle; clones share one backend, config and sweep timer.
#[derive(Clone)]
pub struct ExpiringCache {
    inner: Arc<Inner>,
}

struct Inner {
    storage: Storage,
    namespace: String,
    version: Option<String>,
    limits: RwLock<Limits>,
    stats: Mutex<CacheStats>,
    sweeper: Debouncer,
}

impl ExpiringCache {
    // == Constructor ==
    /// Creates a cache and schedules an initial sweep.
    pub fn new(options: CacheOptions) -> Self {
        let namespace = options
            .ns
            .filter(|ns| !ns.is_empty())
            .map(|ns| format!("{}.", ns))
            .unwrap_or_default();

        let cache = Self {
            inner: Arc::new(Inner {
                storage: options.storage.unwrap_or_default(),
                namespace,
                version: options.version,
                limits: RwLock::new(Limits {
                    capacity: options.capacity,
                    max_age: options.max_age,
                }),
                stats: Mutex::new(CacheStats::new()),
                sweeper: Debouncer::new(SWEEP_DELAY),
            }),
        };

        cache.schedule_sweep();
        cache
    }

    // == Accessors ==
    /// The backend key prefix, including the trailing dot (empty when unset).
    pub fn namespace(&self) -> &str {
        &self.inner.namespace
    }

    pub fn version(&self) -> Option<&str> {
        self.inner.version.as_deref()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.inner.limits.read().capacity
    }

    pub fn max_age(&self) -> Option<u64> {
        self.inner.limits.read().max_age
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats.lock().clone()
    }

    // == Configuration ==
    /// Replaces the logical capacity (None = unbounded) and schedules a sweep.
    pub fn set_capacity(&self, capacity: Option<usize>) {
        self.inner.limits.write().capacity = capacity;
        self.schedule_sweep();
    }

    /// Replaces the max age in milliseconds (None = unbounded) and schedules a sweep.
    pub fn set_max_age(&self, max_age: Option<u64>) {
        self.inner.limits.write().max_age = max_age;
        self.schedule_sweep();
    }

    // == Get ==
    /// Reads a value.
    ///
    /// Backend failures, corrupt data, expired entries and version mismatches
    /// all read as `None`. An expired or mismatched entry is also removed in
    /// the background; the read does not wait for that removal.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.lookup(key).await {
            Lookup::Hit(value) => match serde_json::from_value(value) {
                Ok(value) => {
                    self.inner.stats.lock().record_hit();
                    Some(value)
                }
                Err(e) => {
                    debug!("Cached value for {} has an unexpected shape: {}", key, e);
                    self.inner.stats.lock().record_miss();
                    None
                }
            },
            Lookup::Miss => {
                self.inner.stats.lock().record_miss();
                None
            }
            Lookup::Invalid => {
                self.inner.stats.lock().record_invalidation();
                self.spawn_removal(key);
                None
            }
        }
    }

    async fn lookup(&self, key: &str) -> Lookup {
        let raw = match self.inner.storage.get(&self.backend_key(key)).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Lookup::Miss,
            Err(e) => {
                debug!("Backend read for {} failed, treating as miss: {}", key, e);
                return Lookup::Miss;
            }
        };

        let parsed = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Null) | Err(_) => return Lookup::Miss,
            Ok(parsed) => parsed,
        };

        // Readable JSON that isn't an envelope (or carries a foreign tag) is stale
        match serde_json::from_value::<Envelope<Value>>(parsed) {
            Ok(envelope) if envelope.is_valid(self.max_age(), self.version()) => {
                Lookup::Hit(envelope.value)
            }
            _ => Lookup::Invalid,
        }
    }

    /// Detached removal of an invalid entry; failures are only logged.
    fn spawn_removal(&self, key: &str) {
        let Ok(handle) = Handle::try_current() else {
            return;
        };

        let cache = self.clone();
        let key = key.to_string();
        handle.spawn(async move {
            match cache.remove(&key).await {
                Ok(()) => debug!("Removed invalid entry {}", key),
                Err(e) => warn!("Failed to remove invalid entry {}: {}", key, e),
            }
        });
    }

    // == Set ==
    /// Stores a value stamped with the current time and version, then
    /// schedules a sweep. Backend failures propagate.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let envelope = Envelope::new(value, self.inner.version.clone());
        let raw = serde_json::to_string(&envelope)?;

        self.inner.storage.set(&self.backend_key(key), raw).await?;
        self.schedule_sweep();
        Ok(())
    }

    // == Remove ==
    pub async fn remove(&self, key: &str) -> Result<()> {
        self.inner.storage.remove(&self.backend_key(key)).await
    }

    // == Clear ==
    /// Clears the whole backend. Namespaces sharing the backend are cleared too.
    pub async fn clear(&self) -> Result<()> {
        self.inner.storage.clear().await
    }

    // == Enumeration ==
    /// Raw backend key at `index`, namespace prefix included.
    pub async fn key_at(&self, index: usize) -> Result<Option<String>> {
        self.inner.storage.key(index).await
    }

    /// Logical keys in this namespace, in backend order.
    pub async fn keys(&self) -> Result<Vec<String>> {
        let keys = self.inner.storage.keys().await?;
        let namespace = &self.inner.namespace;

        if namespace.is_empty() {
            return Ok(keys);
        }

        Ok(keys
            .into_iter()
            .filter_map(|key| key.strip_prefix(namespace.as_str()).map(str::to_string))
            .collect())
    }

    // == Sweep ==
    /// Removes the oldest keys beyond capacity and every invalid entry.
    ///
    /// All removals and reads run concurrently. Individual failures are logged
    /// and do not fail the sweep; only enumerating the keys can.
    pub async fn sweep(&self) -> Result<()> {
        let keys = self.keys().await?;
        let overflow = self
            .capacity()
            .map_or(0, |capacity| keys.len().saturating_sub(capacity));

        let mut tasks = JoinSet::new();
        for (index, key) in keys.into_iter().enumerate() {
            let cache = self.clone();
            tasks.spawn(async move {
                if index < overflow {
                    cache.remove(&key).await.map(|_| Swept::Evicted)
                } else {
                    match cache.lookup(&key).await {
                        Lookup::Invalid => cache.remove(&key).await.map(|_| Swept::Invalidated),
                        Lookup::Hit(_) | Lookup::Miss => Ok(Swept::Kept),
                    }
                }
            });
        }

        let (mut evicted, mut invalidated) = (0u64, 0u64);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(Swept::Evicted)) => evicted += 1,
                Ok(Ok(Swept::Invalidated)) => invalidated += 1,
                Ok(Ok(Swept::Kept)) => {}
                Ok(Err(e)) => warn!("Sweep failed to remove an entry: {}", e),
                Err(e) => warn!("Sweep task failed: {}", e),
            }
        }

        {
            let mut stats = self.inner.stats.lock();
            stats.record_evictions(evicted);
            stats.invalidations += invalidated;
            stats.record_sweep();
        }

        if evicted + invalidated > 0 {
            info!(
                "Sweep: evicted {} entries over capacity, removed {} invalid entries",
                evicted, invalidated
            );
        } else {
            debug!("Sweep: nothing to remove");
        }

        Ok(())
    }

    /// Debounces a sweep: any pending sweep is replaced by one [`SWEEP_DELAY`] from now.
    pub fn schedule_sweep(&self) {
        let weak = Arc::downgrade(&self.inner);
        self.inner.sweeper.schedule(async move {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if let Err(e) = (ExpiringCache { inner }).sweep().await {
                warn!("Scheduled sweep failed: {}", e);
            }
        });
    }

    /// True while a scheduled sweep is waiting out its delay.
    pub fn is_sweep_pending(&self) -> bool {
        self.inner.sweeper.is_pending()
    }

    /// Cancels the pending sweep, if any. Dropping the last handle does the same.
    pub fn shutdown(&self) {
        self.inner.sweeper.cancel();
    }

    fn backend_key(&self, key: &str) -> String {
        format!("{}{}", self.inner.namespace, key)
    }
}

impl Default for ExpiringCache {
    fn default() -> Self {
        Self::new(CacheOptions::default())
    }
}

impl std::fmt::Debug for ExpiringCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiringCache")
            .field("storage", &self.inner.storage)
            .field("namespace", &self.inner.namespace)
            .field("version", &self.inner.version)
            .field("capacity", &self.capacity())
            .field("max_age", &self.max_age())
            .finish()
    }
}

enum Swept {
    Evicted,
    Invalidated,
    Kept,
}
