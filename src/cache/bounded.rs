//! Bounded Store Module
//!
//! Insertion-ordered key/value container with FIFO eviction.

use std::collections::{HashMap, VecDeque};

// == Bounded Store ==
/// Fixed-capacity key/value container that evicts the oldest appended key.
///
/// `order` is an insertion log rather than an ordered map:
/// - Front = earliest appended key still present
/// - Back = most recently appended key
///
/// Setting a key that is already present appends it again, so repeated sets of
/// one key consume one capacity slot each. Removing or evicting a key drops the
/// first occurrence from the log together with the stored value.
#[derive(Debug, Default)]
pub struct BoundedStore {
    /// Insertion log of keys
    order: VecDeque<String>,
    /// Raw values by key
    values: HashMap<String, String>,
    /// Maximum number of log entries, None = unbounded
    capacity: Option<usize>,
}

impl BoundedStore {
    // == Constructor ==
    /// Creates an empty store with the given capacity (None = unbounded).
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            order: VecDeque::new(),
            values: HashMap::new(),
            capacity,
        }
    }

    // == Capacity ==
    /// Replaces the capacity and evicts any overflow immediately.
    pub fn set_capacity(&mut self, capacity: Option<usize>) {
        self.capacity = capacity;
        self.evict_overflow();
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    // == Get ==
    /// Looks up a value without touching the insertion order.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    // == Set ==
    /// Appends `key` to the log, stores the value, then evicts overflow.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.order.push_back(key.clone());
        self.values.insert(key, value.into());
        self.evict_overflow();
    }

    // == Remove ==
    /// Removes the first occurrence of `key`. No-op if absent.
    pub fn remove(&mut self, key: &str) {
        if let Some(index) = self.order.iter().position(|k| k == key) {
            self.order.remove(index);
            self.values.remove(key);
        }
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.order.clear();
        self.values.clear();
    }

    // == Enumeration ==
    /// Returns the key at `index` in the insertion log.
    pub fn key_at(&self, index: usize) -> Option<&str> {
        self.order.get(index).map(String::as_str)
    }

    /// Returns a snapshot of the insertion log.
    pub fn keys(&self) -> Vec<String> {
        self.order.iter().cloned().collect()
    }

    /// Number of entries in the insertion log.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Calls `f(value, key, index)` for every logged key at call time.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(Option<&str>, &str, usize),
    {
        for (index, key) in self.order.iter().enumerate() {
            f(self.get(key), key, index);
        }
    }

    // == Eviction ==
    fn evict_overflow(&mut self) {
        let Some(capacity) = self.capacity else {
            return;
        };

        while self.order.len() > capacity {
            match self.order.front().cloned() {
                Some(oldest) => self.remove(&oldest),
                None => break,
            }
        }
    }
}
