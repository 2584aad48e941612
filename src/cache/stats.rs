//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, evictions and flushes.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals
    pub misses: u64,
    /// Number of entries evicted due to LRU policy
    pub evictions: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Mutations waiting for the next flush
    pub dirty_entries: usize,
    /// Number of flushes that replayed at least one record
    pub flushes: u64,
    /// Total records handed to the sink
    pub flushed_records: u64,
    /// Start time of the last non-empty flush
    pub last_flush_at: Option<DateTime<Utc>>,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Record Flush ==
    /// Counts a replay of `records` mutations. Empty flushes are not counted.
    pub fn record_flush(&mut self, records: usize) {
        if records == 0 {
            return;
        }
        self.flushes += 1;
        self.flushed_records += records as u64;
        self.last_flush_at = Some(Utc::now());
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }

    pub fn set_dirty_entries(&mut self, count: usize) {
        self.dirty_entries = count;
    }
}
