//! Backend Module
//!
//! Key/value stores an `ExpiringCache` can sit on top of.
//!
//! Every backend implements [`Backend`] plus exactly one enumeration capability:
//! - [`BulkBackend`] hands out all keys at once
//! - [`IndexedBackend`] exposes a length and is walked with [`Backend::key`]
//!
//! The variant is fixed when the backend is wrapped in a [`Storage`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::cache::BoundedStore;
use crate::error::Result;

// == Backend Traits ==
/// Core key/value operations. Values are raw serialized strings.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: String) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;

    async fn clear(&self) -> Result<()>;

    /// Key at `index` in the backend's own enumeration order.
    async fn key(&self, index: usize) -> Result<Option<String>>;
}

/// Backend able to return every key in one call.
#[async_trait]
pub trait BulkBackend: Backend {
    async fn keys(&self) -> Result<Vec<String>>;
}

/// Backend enumerated by index, `0..length()`.
#[async_trait]
pub trait IndexedBackend: Backend {
    async fn length(&self) -> Result<usize>;
}

// == Storage ==
/// A backend tagged with how its keys are enumerated.
#[derive(Clone)]
pub enum Storage {
    Bulk(Arc<dyn BulkBackend>),
    Indexed(Arc<dyn IndexedBackend>),
}

impl Storage {
    pub fn bulk(backend: impl BulkBackend + 'static) -> Self {
        Storage::Bulk(Arc::new(backend))
    }

    pub fn indexed(backend: impl IndexedBackend + 'static) -> Self {
        Storage::Indexed(Arc::new(backend))
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        match self {
            Storage::Bulk(backend) => backend.get(key).await,
            Storage::Indexed(backend) => backend.get(key).await,
        }
    }

    pub async fn set(&self, key: &str, value: String) -> Result<()> {
        match self {
            Storage::Bulk(backend) => backend.set(key, value).await,
            Storage::Indexed(backend) => backend.set(key, value).await,
        }
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        match self {
            Storage::Bulk(backend) => backend.remove(key).await,
            Storage::Indexed(backend) => backend.remove(key).await,
        }
    }

    pub async fn clear(&self) -> Result<()> {
        match self {
            Storage::Bulk(backend) => backend.clear().await,
            Storage::Indexed(backend) => backend.clear().await,
        }
    }

    pub async fn key(&self, index: usize) -> Result<Option<String>> {
        match self {
            Storage::Bulk(backend) => backend.key(index).await,
            Storage::Indexed(backend) => backend.key(index).await,
        }
    }

    /// Every raw backend key, in backend order.
    pub async fn keys(&self) -> Result<Vec<String>> {
        match self {
            Storage::Bulk(backend) => backend.keys().await,
            Storage::Indexed(backend) => {
                let size = backend.length().await?;
                let mut keys = Vec::with_capacity(size);
                for index in 0..size {
                    if let Some(key) = backend.key(index).await? {
                        keys.push(key);
                    }
                }
                Ok(keys)
            }
        }
    }
}

impl Default for Storage {
    fn default() -> Self {
        Storage::bulk(MemoryBackend::default())
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Storage::Bulk(_) => f.write_str("Storage::Bulk"),
            Storage::Indexed(_) => f.write_str("Storage::Indexed"),
        }
    }
}

// == Memory Backend ==
/// In-process backend over a [`BoundedStore`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    store: Mutex<BoundedStore>,
}

impl MemoryBackend {
    /// Creates a memory backend holding at most `capacity` log entries.
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            store: Mutex::new(BoundedStore::new(capacity)),
        }
    }

    pub fn set_capacity(&self, capacity: Option<usize>) {
        self.store.lock().set_capacity(capacity);
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.store.lock().get(key).map(str::to_string))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.store.lock().set(key, value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.store.lock().remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.store.lock().clear();
        Ok(())
    }

    async fn key(&self, index: usize) -> Result<Option<String>> {
        Ok(self.store.lock().key_at(index).map(str::to_string))
    }
}

#[async_trait]
impl BulkBackend for MemoryBackend {
    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.store.lock().keys())
    }
}

// == File Backend ==
/// Persistent backend kept as a single JSON object file.
///
/// Keys enumerate in sorted order. Every mutation rewrites the whole file, so a
/// failed write leaves the previous file contents in place.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    entries: tokio::sync::Mutex<BTreeMap<String, String>>,
}

impl FileBackend {
    /// Opens (or lazily creates) the backing file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        debug!("Opened file backend at {} with {} keys", path.display(), entries.len());

        Ok(Self {
            path,
            entries: tokio::sync::Mutex::new(entries),
        })
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let bytes = serde_json::to_vec(entries)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }

    /// Applies `mutate` to a copy, persists it, then commits it in memory.
    async fn update<F>(&self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) + Send,
    {
        let mut entries = self.entries.lock().await;
        let mut next = entries.clone();
        mutate(&mut next);
        self.persist(&next).await?;
        *entries = next;
        Ok(())
    }
}

#[async_trait]
impl Backend for FileBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let key = key.to_string();
        self.update(move |entries| {
            entries.insert(key, value);
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.update(|entries| {
            entries.remove(key);
        })
        .await
    }

    async fn clear(&self) -> Result<()> {
        self.update(|entries| entries.clear()).await
    }

    async fn key(&self, index: usize) -> Result<Option<String>> {
        Ok(self.entries.lock().await.keys().nth(index).cloned())
    }
}

#[async_trait]
impl IndexedBackend for FileBackend {
    async fn length(&self) -> Result<usize> {
        Ok(self.entries.lock().await.len())
    }
}
