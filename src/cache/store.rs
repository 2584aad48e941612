//! LRU Store Module
//!
//! Single-threaded cache engine combining a HashMap index with the recency list.

use std::collections::HashMap;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, NodeId, RecencyList};

/// Upper bound on up-front allocation, used for unbounded or very large caches.
const PREALLOC_LIMIT: usize = 1024;

// == LRU Store ==
/// Key-value storage with LRU eviction.
///
/// Invariant: the index and the recency list always hold the same key set, and
/// every handle in the index points at the node carrying its key.
#[derive(Debug)]
pub struct LruStore<V> {
    /// Key to list-node lookup
    index: HashMap<String, NodeId>,
    /// Recency order of resident entries
    list: RecencyList<V>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries, `None` = unbounded
    capacity: Option<usize>,
}

impl<V> LruStore<V> {
    // == Constructor ==
    /// Creates a new LruStore.
    ///
    /// # Arguments
    /// * `capacity` - `None` never evicts, `Some(0)` retains nothing,
    ///   `Some(n)` holds at most `n` entries
    pub fn new(capacity: Option<usize>) -> Self {
        let prealloc = capacity.unwrap_or(PREALLOC_LIMIT).min(PREALLOC_LIMIT);
        Self {
            index: HashMap::with_capacity(prealloc),
            list: RecencyList::with_capacity(prealloc),
            stats: CacheStats::new(),
            capacity,
        }
    }

    // == Get ==
    /// Retrieves a value by key and marks it most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        match self.index.get(key) {
            Some(&id) => {
                self.list.move_to_front(id);
                self.stats.record_hit();
                self.list.get(id).map(|entry| &entry.value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Peek ==
    /// Retrieves a value without touching recency or statistics.
    pub fn peek(&self, key: &str) -> Option<&V> {
        self.index
            .get(key)
            .and_then(|&id| self.list.get(id))
            .map(|entry| &entry.value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    // == Set ==
    /// Stores a key-value pair.
    ///
    /// An existing key gets the new value and moves to the front. A new key is
    /// inserted at the front; if that pushes the store over capacity, the least
    /// recently used entry is evicted and returned. With capacity zero the new
    /// entry is itself the one evicted.
    pub fn set(&mut self, key: String, value: V) -> Option<CacheEntry<V>> {
        if let Some(&id) = self.index.get(&key) {
            if let Some(entry) = self.list.get_mut(id) {
                entry.value = value;
            }
            self.list.move_to_front(id);
            return None;
        }

        let id = self.list.push_front(CacheEntry::new(key.clone(), value));
        self.index.insert(key, id);

        let evicted = match self.capacity {
            Some(capacity) if self.index.len() > capacity => self.evict_lru(),
            _ => None,
        };
        self.stats.set_total_entries(self.index.len());
        evicted
    }

    // == Delete ==
    /// Removes an entry by key, returning its last value.
    pub fn delete(&mut self, key: &str) -> Option<V> {
        let id = self.index.remove(key)?;
        let entry = self.list.remove(id);
        self.stats.set_total_entries(self.index.len());
        entry.map(|entry| entry.value)
    }

    // == Capacity ==
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Changes the capacity, evicting least recently used entries until the
    /// store fits. Returns the evicted entries, oldest first.
    pub fn set_capacity(&mut self, capacity: Option<usize>) -> Vec<CacheEntry<V>> {
        self.capacity = capacity;
        let mut evicted = Vec::new();
        if let Some(capacity) = capacity {
            while self.index.len() > capacity {
                match self.evict_lru() {
                    Some(entry) => evicted.push(entry),
                    None => break,
                }
            }
        }
        self.stats.set_total_entries(self.index.len());
        evicted
    }

    // == Clear ==
    /// Drops every entry. Not counted as evictions.
    pub fn clear(&mut self) {
        self.index.clear();
        self.list.clear();
        self.stats.set_total_entries(0);
    }

    // == Snapshot ==
    /// Iterates resident entries from most to least recently used.
    pub fn entries(&self) -> impl Iterator<Item = &CacheEntry<V>> {
        self.list.iter()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.index.len());
        stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut CacheStats {
        &mut self.stats
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn evict_lru(&mut self) -> Option<CacheEntry<V>> {
        let entry = self.list.pop_back()?;
        self.index.remove(&entry.key);
        self.stats.record_eviction();
        debug!(key = %entry.key, "Evicted least recently used entry");
        Some(entry)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn store(capacity: Option<usize>) -> LruStore<String> {
        LruStore::new(capacity)
    }

    fn set(store: &mut LruStore<String>, key: &str, value: &str) -> Option<CacheEntry<String>> {
        store.set(key.to_string(), value.to_string())
    }

    fn assert_consistent(store: &LruStore<String>) {
        assert_eq!(store.index.len(), store.list.len());
        for (key, &id) in &store.index {
            assert_eq!(store.list.get(id).map(|e| e.key.as_str()), Some(key.as_str()));
        }
    }

    #[test]
    fn test_store_new() {
        let store = store(Some(100));
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.capacity(), Some(100));
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store(Some(100));

        set(&mut store, "key1", "value1");

        assert_eq!(store.get("key1").map(String::as_str), Some("value1"));
        assert_eq!(store.len(), 1);
        assert_consistent(&store);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = store(Some(100));
        assert!(store.get("nonexistent").is_none());
    }

    #[test]
    fn test_store_delete() {
        let mut store = store(Some(100));

        set(&mut store, "key1", "value1");
        let removed = store.delete("key1");

        assert_eq!(removed.as_deref(), Some("value1"));
        assert!(store.is_empty());
        assert!(store.get("key1").is_none());
        assert_consistent(&store);
    }

    #[test]
    fn test_store_delete_nonexistent() {
        let mut store = store(Some(100));
        set(&mut store, "key1", "value1");

        assert!(store.delete("nonexistent").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = store(Some(100));

        set(&mut store, "key1", "value1");
        let evicted = set(&mut store, "key1", "value2");

        assert!(evicted.is_none());
        assert_eq!(store.get("key1").map(String::as_str), Some("value2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = store(Some(3));

        set(&mut store, "key1", "value1");
        set(&mut store, "key2", "value2");
        set(&mut store, "key3", "value3");

        // Cache is full, adding key4 should evict key1 (oldest)
        let evicted = set(&mut store, "key4", "value4");

        assert_eq!(evicted.map(|e| e.key), Some("key1".to_string()));
        assert_eq!(store.len(), 3);
        assert!(store.get("key1").is_none());
        assert!(store.get("key2").is_some());
        assert!(store.get("key3").is_some());
        assert!(store.get("key4").is_some());
        assert_consistent(&store);
    }

    #[test]
    fn test_store_lru_touch_on_get() {
        let mut store = store(Some(3));

        set(&mut store, "key1", "value1");
        set(&mut store, "key2", "value2");
        set(&mut store, "key3", "value3");

        // Access key1 to make it most recently used
        store.get("key1");

        // Adding key4 should evict key2 (now oldest)
        set(&mut store, "key4", "value4");

        assert!(store.get("key1").is_some());
        assert!(store.get("key2").is_none());
    }

    #[test]
    fn test_store_overwrite_refreshes_recency() {
        let mut store = store(Some(2));

        set(&mut store, "a", "1");
        set(&mut store, "b", "2");
        set(&mut store, "a", "3");
        set(&mut store, "c", "4");

        assert!(store.contains("a"));
        assert!(!store.contains("b"));
    }

    #[test]
    fn test_store_peek_keeps_order() {
        let mut store = store(Some(2));

        set(&mut store, "a", "1");
        set(&mut store, "b", "2");
        assert_eq!(store.peek("a").map(String::as_str), Some("1"));
        set(&mut store, "c", "3");

        assert!(!store.contains("a"));
        assert_eq!(store.stats().hits, 0);
    }

    #[test]
    fn test_store_zero_capacity_retains_nothing() {
        let mut store = store(Some(0));

        let evicted = set(&mut store, "key1", "value1");

        assert_eq!(evicted.map(|e| e.key), Some("key1".to_string()));
        assert!(store.is_empty());
        assert!(store.get("key1").is_none());
        assert_consistent(&store);
    }

    #[test]
    fn test_store_unbounded() {
        let mut store = store(None);

        for i in 0..5000 {
            set(&mut store, &format!("key{i}"), "v");
        }

        assert_eq!(store.len(), 5000);
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_store_set_capacity_shrinks() {
        let mut store = store(Some(5));
        for key in ["a", "b", "c", "d", "e"] {
            set(&mut store, key, "v");
        }

        let evicted = store.set_capacity(Some(2));

        let evicted: Vec<String> = evicted.into_iter().map(|e| e.key).collect();
        assert_eq!(evicted, vec!["a", "b", "c"]);
        assert_eq!(store.len(), 2);
        assert_consistent(&store);

        // Back under the bound, the next insert evicts exactly one entry
        set(&mut store, "f", "v");
        assert_eq!(store.len(), 2);
        assert!(!store.contains("d"));
    }

    #[test]
    fn test_store_entries_in_recency_order() {
        let mut store = store(None);
        set(&mut store, "a", "1");
        set(&mut store, "b", "2");
        set(&mut store, "c", "3");
        store.get("a");

        let keys: Vec<&str> = store.entries().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "c", "b"]);
    }

    #[test]
    fn test_store_stats() {
        let mut store = store(Some(1));

        set(&mut store, "key1", "value1");
        store.get("key1"); // hit
        store.get("nonexistent"); // miss
        set(&mut store, "key2", "value2"); // evicts key1

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_store_clear() {
        let mut store = store(Some(10));
        set(&mut store, "a", "1");
        set(&mut store, "b", "2");

        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.entries().count(), 0);
        assert_eq!(store.stats().evictions, 0);
    }
}
