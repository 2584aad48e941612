//! Simple Cache Module
//!
//! Thread-safe LRU cache with no backing sink.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::cache::{Cache, CacheEntry, CacheStats, LruStore};
use crate::config::CacheConfig;

// == Simple Cache ==
/// Pure in-memory LRU cache.
///
/// Every operation holds a single lock for its whole body. [`SimpleCache::flush`]
/// is a no-op kept for the shared [`Cache`] capability.
#[derive(Debug)]
pub struct SimpleCache<V> {
    store: Mutex<LruStore<V>>,
}

impl<V> SimpleCache<V> {
    // == Constructor ==
    /// Creates a cache holding at most `capacity` entries (`None` = unbounded).
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            store: Mutex::new(LruStore::new(capacity)),
        }
    }

    /// Creates a cache from configuration. Only the capacity applies.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.capacity)
    }

    /// Stores a key-value pair, evicting the least recently used entry when full.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.lock().set(key.into(), value);
    }

    /// Removes an entry, returning its last value.
    pub fn delete(&self, key: &str) -> Option<V> {
        self.lock().delete(key)
    }

    // == Accessors ==
    /// Returns true if `key` is resident, without touching recency.
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains(key)
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true when nothing is resident.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Current capacity; `None` means unbounded.
    pub fn capacity(&self) -> Option<usize> {
        self.lock().capacity()
    }

    /// Changes the capacity, evicting least recently used entries as needed.
    /// Returns the number of evicted entries.
    pub fn set_capacity(&self, capacity: Option<usize>) -> usize {
        self.lock().set_capacity(capacity).len()
    }

    /// Drops every entry. Statistics are kept.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Nothing to flush without a sink.
    pub fn flush(&self) -> usize {
        0
    }

    /// Snapshot of cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.lock().stats()
    }

    fn lock(&self) -> MutexGuard<'_, LruStore<V>> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V: Clone> SimpleCache<V> {
    /// Retrieves a value and marks it most recently used.
    pub fn get(&self, key: &str) -> Option<V> {
        self.lock().get(key).cloned()
    }

    /// Retrieves a value without changing recency.
    pub fn peek(&self, key: &str) -> Option<V> {
        self.lock().peek(key).cloned()
    }

    /// Snapshot of resident entries, most recently used first.
    pub fn entries(&self) -> Vec<CacheEntry<V>> {
        self.lock().entries().cloned().collect()
    }
}

impl<V: Clone + Send> Cache<V> for SimpleCache<V> {
    fn len(&self) -> usize {
        SimpleCache::len(self)
    }

    fn set(&self, key: String, value: V) {
        SimpleCache::set(self, key, value);
    }

    fn get(&self, key: &str) -> Option<V> {
        SimpleCache::get(self, key)
    }

    fn delete(&self, key: &str) -> Option<V> {
        SimpleCache::delete(self, key)
    }

    fn flush(&self) -> usize {
        SimpleCache::flush(self)
    }
}
