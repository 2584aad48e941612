//! Sink Module
//!
//! The external store a write-back cache flushes into.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::info;

// == Sink Trait ==
/// Destination of flushed mutations.
///
/// The cache never inspects the outcome of a call: a sink owns its own error
/// handling and retries. Removing an absent key must be a no-op.
///
/// Records within one batch arrive in the order callers issued them. Flushes
/// triggered from different threads, or by the threshold and the timer
/// together, replay disjoint batches concurrently, so a batch detached earlier
/// can land after a later one. Cross-batch ordering, and with it
/// last-write-wins for a key touched in both batches, only holds when replays
/// do not overlap. Implementations must be safe under concurrent calls, and
/// must order by their own means (versioning, serializing flushes) if they
/// need last-write-wins across overlapping batches.
pub trait Sink<V>: Send + Sync {
    /// Inserts or replaces `key`.
    fn add(&self, key: String, value: V);

    /// Deletes `key`.
    fn remove(&self, key: String);
}

// == Memory Sink ==
/// Sink backed by a mutex-guarded `HashMap`.
pub struct MemorySink<V> {
    data: Mutex<HashMap<String, V>>,
    adds: AtomicU64,
    removes: AtomicU64,
}

impl<V> Default for MemorySink<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> MemorySink<V> {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
            adds: AtomicU64::new(0),
            removes: AtomicU64::new(0),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of `add` calls received.
    pub fn add_calls(&self) -> u64 {
        self.adds.load(Ordering::Relaxed)
    }

    /// Number of `remove` calls received.
    pub fn remove_calls(&self) -> u64 {
        self.removes.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, V>> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V: Clone> MemorySink<V> {
    pub fn get(&self, key: &str) -> Option<V> {
        self.lock().get(key).cloned()
    }

    /// Copies the current contents.
    pub fn snapshot(&self) -> HashMap<String, V> {
        self.lock().clone()
    }
}

impl<V: Send> Sink<V> for MemorySink<V> {
    fn add(&self, key: String, value: V) {
        self.adds.fetch_add(1, Ordering::Relaxed);
        self.lock().insert(key, value);
    }

    fn remove(&self, key: String) {
        self.removes.fetch_add(1, Ordering::Relaxed);
        self.lock().remove(&key);
    }
}

impl<V> fmt::Debug for MemorySink<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySink")
            .field("len", &self.len())
            .field("adds", &self.add_calls())
            .field("removes", &self.remove_calls())
            .finish()
    }
}

// == Tracing Sink ==
/// Sink that only logs what it receives.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl<V: fmt::Debug> Sink<V> for TracingSink {
    fn add(&self, key: String, value: V) {
        info!(%key, ?value, "Sink add");
    }

    fn remove(&self, key: String) {
        info!(%key, "Sink remove");
    }
}
