//! Background Tasks Module
//!
//! Contains background tasks that run periodically during the cache lifetime.
//!
//! # Tasks
//! - Periodic Flush: Drains the write-back buffer into the sink at a fixed interval

mod flush;

pub use flush::{spawn_flush_task, FlushTask, Flushable};
