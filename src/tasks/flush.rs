//! Periodic Flush Task
//!
//! Background task that periodically drains pending mutations into the sink.

use std::sync::Weak;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Something the flush task can drain.
pub trait Flushable: Send + Sync + 'static {
    /// Replays pending records and returns how many were replayed.
    fn flush(&self) -> usize;
}

// == Flush Task Handle ==
/// Handle to a running periodic flush task.
///
/// Dropping the handle aborts the task; [`FlushTask::stop`] shuts it down and
/// waits for a flush already in progress to finish.
#[derive(Debug)]
pub struct FlushTask {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl FlushTask {
    /// Signals the task to stop and waits until it has exited.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                if !err.is_cancelled() {
                    warn!("Flush task ended abnormally: {}", err);
                }
            }
        }
    }

    /// Cancels the task without waiting.
    pub fn abort(&self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for FlushTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Spawns a background task that flushes `target` every `period`.
///
/// The first flush happens one full period after spawning. The task holds only
/// a weak reference, so it exits on its own once the target is dropped. Each
/// flush runs on the blocking pool so a slow sink cannot stall the runtime.
///
/// # Arguments
/// * `runtime` - Runtime the task is spawned on
/// * `target` - Weak reference to the flushed cache state
/// * `period` - Interval between flushes
///
/// # Example
/// ```ignore
/// let task = spawn_flush_task(&Handle::current(), Arc::downgrade(&shared), period);
/// // Later, during shutdown:
/// task.stop().await;
/// ```
pub fn spawn_flush_task<T: Flushable>(
    runtime: &Handle,
    target: Weak<T>,
    period: Duration,
) -> FlushTask {
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

    let handle = runtime.spawn(async move {
        info!("Starting periodic flush task with interval of {:?}", period);

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    debug!("Periodic flush task received shutdown");
                    break;
                }
                _ = ticker.tick() => {
                    let Some(target) = target.upgrade() else {
                        debug!("Flush target dropped, periodic flush task exiting");
                        break;
                    };

                    match tokio::task::spawn_blocking(move || target.flush()).await {
                        Ok(0) => debug!("Periodic flush: nothing pending"),
                        Ok(flushed) => debug!("Periodic flush: replayed {} records", flushed),
                        Err(err) => warn!("Periodic flush failed: {}", err),
                    }
                }
            }
        }
    });

    FlushTask {
        shutdown: Some(shutdown_tx),
        handle: Some(handle),
    }
}
