//! Configuration Module
//!
//! Handles loading cache parameters from environment variables.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Longest flush period accepted by [`CacheConfig::validate`].
const MAX_FLUSH_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries, `None` = unbounded
    pub capacity: Option<usize>,
    /// Dirty-queue length that triggers a flush, `None` = never
    pub max_dirty: Option<usize>,
    /// Interval of the background flush, `None` = no periodic flush
    pub flush_period: Option<Duration>,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum entries, negative = unbounded (default: 1000)
    /// - `CACHE_MAX_DIRTY` - Flush threshold, negative = disabled (default: 100)
    /// - `CACHE_FLUSH_PERIOD_MS` - Flush interval in ms, 0 = disabled (default: 1000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: env_signed("CACHE_CAPACITY").map_or(defaults.capacity, non_negative),
            max_dirty: env_signed("CACHE_MAX_DIRTY").map_or(defaults.max_dirty, non_negative),
            flush_period: env::var("CACHE_FLUSH_PERIOD_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map_or(defaults.flush_period, |ms| {
                    Some(Duration::from_millis(ms)).filter(|d| !d.is_zero())
                }),
        }
    }

    /// Rejects flush periods that are almost certainly a unit mistake.
    pub fn validate(&self) -> Result<()> {
        match self.flush_period {
            Some(period) if period > MAX_FLUSH_PERIOD => Err(CacheError::InvalidConfig(format!(
                "flush period {:?} exceeds {:?}",
                period, MAX_FLUSH_PERIOD
            ))),
            _ => Ok(()),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: Some(1000),
            max_dirty: Some(100),
            flush_period: Some(Duration::from_secs(1)),
        }
    }
}

fn env_signed(name: &str) -> Option<i64> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Maps the signed convention (negative = disabled) onto `Option`.
pub(crate) fn non_negative(value: i64) -> Option<usize> {
    usize::try_from(value).ok()
}
