//! Writeback Cache - An in-process LRU cache with an optional write-back buffer
//!
//! [`SimpleCache`] is a plain bounded LRU cache. [`WriteBackCache`] adds a queue
//! of pending mutations that is replayed against a [`Sink`] once enough of them
//! pile up or on a fixed interval.

pub mod cache;
pub mod config;
pub mod error;
pub mod sink;
pub mod tasks;

pub use cache::{Cache, CacheStats, SimpleCache, WriteBackBuilder, WriteBackCache};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use sink::{MemorySink, Sink, TracingSink};
