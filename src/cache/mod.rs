//! Cache Module
//!
//! Provides in-memory caching with LRU eviction, plus a write-back variant that
//! buffers mutations and flushes them to an external sink.

mod dirty;
mod entry;
mod lru;
mod simple;
mod stats;
mod store;
mod write_back;


// Re-export public types
pub use dirty::DirtyQueue;
pub use entry::{CacheEntry, DirtyRecord, Mutation};
pub use lru::{NodeId, RecencyList};
pub use simple::SimpleCache;
pub use stats::CacheStats;
pub use store::LruStore;
pub use write_back::{WriteBackBuilder, WriteBackCache};

// == Cache Capability ==
/// Operations shared by every cache variant.
///
/// All methods take `&self`; implementations serialize calls internally so one
/// instance can be shared across threads.
pub trait Cache<V>: Send + Sync {
    /// Current number of resident entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts or replaces `key`, marking it most recently used.
    fn set(&self, key: String, value: V);

    /// Returns the value of `key` and marks it most recently used.
    fn get(&self, key: &str) -> Option<V>;

    /// Removes `key`, returning its last cached value.
    fn delete(&self, key: &str) -> Option<V>;

    /// Pushes pending mutations to the sink, returning how many were replayed.
    fn flush(&self) -> usize;
}
