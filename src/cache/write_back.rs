//! Write-Back Cache Module
//!
//! LRU cache that records every caller mutation and replays them against a
//! [`Sink`] in batches, either once enough mutations are pending or on a timer.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::cache::{Cache, CacheEntry, CacheStats, DirtyQueue, DirtyRecord, LruStore, Mutation};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::sink::Sink;
use crate::tasks::{spawn_flush_task, FlushTask, Flushable};

/// Everything guarded by the cache lock.
struct State<V> {
    store: LruStore<V>,
    dirty: DirtyQueue<V>,
}

/// State shared between the cache handle and its flush task.
struct Shared<V> {
    state: Mutex<State<V>>,
    sink: Arc<dyn Sink<V>>,
    max_dirty: Option<usize>,
}

impl<V> Shared<V> {
    fn lock(&self) -> MutexGuard<'_, State<V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn over_threshold(&self, state: &State<V>) -> bool {
        self.max_dirty
            .is_some_and(|max_dirty| state.dirty.len() >= max_dirty)
    }

    // == Flush ==
    /// Detaches the dirty queue under the lock, then replays it in order with
    /// the lock released so sink calls never block cache callers.
    fn flush(&self) -> usize {
        let records = {
            let mut state = self.lock();
            let records = state.dirty.take();
            state.store.stats_mut().record_flush(records.len());
            records
        };

        let count = records.len();
        if count == 0 {
            debug!("Flush: no pending mutations");
            return 0;
        }

        for record in records {
            match record.mutation {
                Mutation::Upsert(value) => self.sink.add(record.key, value),
                Mutation::Remove => self.sink.remove(record.key),
            }
        }

        info!("Flush: replayed {} mutations to sink", count);
        count
    }
}

impl<V: Send + 'static> Flushable for Shared<V> {
    fn flush(&self) -> usize {
        Shared::flush(self)
    }
}

// == Write-Back Cache ==
/// LRU cache with a write-back buffer in front of a [`Sink`].
///
/// `set` and `delete` append a record to the dirty queue in the same critical
/// section as the LRU update. Evictions only drop the in-memory copy and never
/// produce a record. Records reach the sink in the order they were appended.
///
/// Built through [`WriteBackCache::builder`].
pub struct WriteBackCache<V> {
    shared: Arc<Shared<V>>,
    flush_task: Mutex<Option<FlushTask>>,
    flush_period: Option<Duration>,
}

impl<V: Clone + Send + 'static> WriteBackCache<V> {
    // == Constructor ==
    /// Starts building a cache: unbounded, no threshold, no timer, no sink.
    pub fn builder() -> WriteBackBuilder<V> {
        WriteBackBuilder::new()
    }

    /// Builds a cache from configuration over `sink`.
    pub fn from_config(config: &CacheConfig, sink: Arc<dyn Sink<V>>) -> Result<Self> {
        config.validate()?;
        WriteBackBuilder::from_config(config).sink(sink).build()
    }

    // == Set ==
    /// Stores a key-value pair and queues an upsert.
    ///
    /// If the dirty queue reached the threshold, flushes after releasing the lock.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let should_flush = {
            let mut state = self.shared.lock();
            state.dirty.push_upsert(key.clone(), value.clone());
            state.store.set(key, value);
            self.shared.over_threshold(&state)
        };

        if should_flush {
            self.flush();
        }
    }

    // == Get ==
    /// Retrieves a value and marks it most recently used.
    pub fn get(&self, key: &str) -> Option<V> {
        self.shared.lock().store.get(key).cloned()
    }

    /// Retrieves a value without changing recency.
    pub fn peek(&self, key: &str) -> Option<V> {
        self.shared.lock().store.peek(key).cloned()
    }

    // == Delete ==
    /// Removes an entry and queues a removal.
    ///
    /// The removal is queued even when the key is not cached, since the sink
    /// may still hold it.
    pub fn delete(&self, key: &str) -> Option<V> {
        let (removed, should_flush) = {
            let mut state = self.shared.lock();
            state.dirty.push_remove(key.to_string());
            let removed = state.store.delete(key);
            (removed, self.shared.over_threshold(&state))
        };

        if should_flush {
            self.flush();
        }
        removed
    }

    // == Flush ==
    /// Replays every pending mutation against the sink.
    ///
    /// Returns the number of replayed records. Flushes may overlap when the
    /// timer and the threshold fire together; each replays a disjoint batch.
    pub fn flush(&self) -> usize {
        self.shared.flush()
    }

    // == Close ==
    /// Stops the periodic flush task, waits for it, then flushes what is left.
    ///
    /// Safe to call more than once, and from any executor: outside a tokio
    /// runtime the final flush runs inline. Returns the records replayed by the
    /// final flush.
    pub async fn close(&self) -> usize {
        let task = self
            .flush_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.stop().await;
            debug!("Periodic flush task stopped");
        }

        // Without a runtime there is no blocking pool, so replay on this thread
        let Ok(runtime) = Handle::try_current() else {
            return self.shared.flush();
        };
        let shared = Arc::clone(&self.shared);
        match runtime.spawn_blocking(move || shared.flush()).await {
            Ok(flushed) => flushed,
            Err(err) => {
                warn!("Final flush failed: {}", err);
                0
            }
        }
    }

    /// Snapshot of queued mutations in replay order.
    pub fn pending(&self) -> Vec<DirtyRecord<V>> {
        self.shared.lock().dirty.iter().cloned().collect()
    }

    /// Snapshot of resident entries, most recently used first.
    pub fn entries(&self) -> Vec<CacheEntry<V>> {
        self.shared.lock().store.entries().cloned().collect()
    }
}

impl<V> WriteBackCache<V> {
    // == Accessors ==
    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.shared.lock().store.len()
    }

    /// Returns true when nothing is resident.
    pub fn is_empty(&self) -> bool {
        self.shared.lock().store.is_empty()
    }

    /// Returns true if `key` is resident, without touching recency.
    pub fn contains(&self, key: &str) -> bool {
        self.shared.lock().store.contains(key)
    }

    /// Number of mutations waiting for the next flush.
    pub fn dirty_len(&self) -> usize {
        self.shared.lock().dirty.len()
    }

    /// Current capacity; `None` means unbounded.
    pub fn capacity(&self) -> Option<usize> {
        self.shared.lock().store.capacity()
    }

    /// Changes the capacity, evicting least recently used entries as needed.
    /// Evictions queue nothing. Returns the number of evicted entries.
    pub fn set_capacity(&self, capacity: Option<usize>) -> usize {
        self.shared.lock().store.set_capacity(capacity).len()
    }

    /// Pending-mutation count that triggers a flush, if any.
    pub fn max_dirty(&self) -> Option<usize> {
        self.shared.max_dirty
    }

    /// Period of the flush timer, if one was started.
    pub fn flush_period(&self) -> Option<Duration> {
        self.flush_period
    }

    // == Stats ==
    /// Snapshot of cache statistics, including the current dirty count.
    pub fn stats(&self) -> CacheStats {
        let state = self.shared.lock();
        let mut stats = state.store.stats();
        stats.set_dirty_entries(state.dirty.len());
        stats
    }
}

impl<V: Clone + Send + 'static> Cache<V> for WriteBackCache<V> {
    fn len(&self) -> usize {
        WriteBackCache::len(self)
    }

    fn set(&self, key: String, value: V) {
        WriteBackCache::set(self, key, value);
    }

    fn get(&self, key: &str) -> Option<V> {
        WriteBackCache::get(self, key)
    }

    fn delete(&self, key: &str) -> Option<V> {
        WriteBackCache::delete(self, key)
    }

    fn flush(&self) -> usize {
        WriteBackCache::flush(self)
    }
}

impl<V> fmt::Debug for WriteBackCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("WriteBackCache")
            .field("len", &state.store.len())
            .field("capacity", &state.store.capacity())
            .field("dirty", &state.dirty.len())
            .field("max_dirty", &self.shared.max_dirty)
            .field("flush_period", &self.flush_period)
            .finish()
    }
}

impl<V> Drop for WriteBackCache<V> {
    fn drop(&mut self) {
        let pending = self.shared.lock().dirty.len();
        if pending > 0 {
            warn!("Dropping write-back cache with {} unflushed mutations", pending);
        }
    }
}

// == Builder ==
/// Builder for [`WriteBackCache`].
pub struct WriteBackBuilder<V> {
    capacity: Option<usize>,
    max_dirty: Option<usize>,
    flush_period: Option<Duration>,
    sink: Option<Arc<dyn Sink<V>>>,
}

impl<V> Default for WriteBackBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> WriteBackBuilder<V> {
    /// Unbounded, no threshold, no timer, no sink.
    pub fn new() -> Self {
        Self {
            capacity: None,
            max_dirty: None,
            flush_period: None,
            sink: None,
        }
    }

    /// Copies capacity, threshold and flush period from configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            capacity: config.capacity,
            max_dirty: config.max_dirty,
            flush_period: config.flush_period,
            sink: None,
        }
    }

    /// Maximum number of resident entries; zero retains nothing.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Never evict.
    pub fn unbounded(mut self) -> Self {
        self.capacity = None;
        self
    }

    /// Flush as soon as `max_dirty` mutations are pending; zero flushes on
    /// every mutation.
    pub fn max_dirty(mut self, max_dirty: usize) -> Self {
        self.max_dirty = Some(max_dirty);
        self
    }

    /// Flush every `period`. Any non-zero period enables the timer.
    pub fn flush_period(mut self, period: Duration) -> Self {
        self.flush_period = Some(period).filter(|p| !p.is_zero());
        self
    }

    /// Destination of flushed mutations. Required.
    pub fn sink(mut self, sink: Arc<dyn Sink<V>>) -> Self {
        self.sink = Some(sink);
        self
    }
}

impl<V: Clone + Send + 'static> WriteBackBuilder<V> {
    /// Builds the cache and starts the periodic flush task if configured.
    ///
    /// # Errors
    /// - [`CacheError::MissingSink`] if no sink was supplied
    /// - [`CacheError::RuntimeUnavailable`] if a flush period is set outside
    ///   of a tokio runtime
    pub fn build(self) -> Result<WriteBackCache<V>> {
        let sink = self.sink.ok_or(CacheError::MissingSink)?;
        let flush_period = self.flush_period.filter(|p| !p.is_zero());
        let runtime = match flush_period {
            Some(_) => Some(
                Handle::try_current()
                    .map_err(|err| CacheError::RuntimeUnavailable(err.to_string()))?,
            ),
            None => None,
        };

        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                store: LruStore::new(self.capacity),
                dirty: DirtyQueue::new(),
            }),
            sink,
            max_dirty: self.max_dirty,
        });

        let flush_task = match (runtime, flush_period) {
            (Some(runtime), Some(period)) => {
                Some(spawn_flush_task(&runtime, Arc::downgrade(&shared), period))
            }
            _ => None,
        };

        info!(
            "Write-back cache created: capacity={:?}, max_dirty={:?}, flush_period={:?}",
            self.capacity, self.max_dirty, flush_period
        );

        Ok(WriteBackCache {
            shared,
            flush_task: Mutex::new(flush_task),
            flush_period,
        })
    }
}
