//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache construction and configuration.
///
/// Absent keys are not errors: lookups return `Option`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A write-back cache was built without a sink
    #[error("Write-back cache requires a sink; use SimpleCache for a cache without one")]
    MissingSink,

    /// A periodic flush was requested outside of a tokio runtime
    #[error("No async runtime available for the flush task: {0}")]
    RuntimeUnavailable(String),

    /// Configuration values are out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
