//! Writeback Cache demo
//!
//! Runs a small workload against a write-back cache whose sink logs every
//! flushed mutation, until interrupted.

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use writeback_cache::{CacheConfig, Sink, TracingSink, WriteBackCache};

/// Number of distinct keys the workload cycles through.
const KEY_SPACE: u64 = 64;

/// Main entry point for the demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the write-back cache (starts the periodic flush task)
/// 4. Drive a read/write workload until SIGINT/SIGTERM
/// 5. Close the cache, flushing whatever is still pending
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "writeback_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting write-back cache demo");

    let config = CacheConfig::from_env();
    info!(
        "Configuration loaded: capacity={:?}, max_dirty={:?}, flush_period={:?}",
        config.capacity, config.max_dirty, config.flush_period
    );

    let sink: Arc<dyn Sink<String>> = Arc::new(TracingSink);
    let cache = WriteBackCache::from_config(&config, sink)?;

    let mut ticker = tokio::time::interval(Duration::from_millis(100));
    let mut step: u64 = 0;
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                let key = format!("key{}", step % KEY_SPACE);
                match step % 5 {
                    0 => {
                        cache.delete(&key);
                    }
                    1 | 2 => {
                        cache.get(&key);
                    }
                    _ => cache.set(key, format!("value{step}")),
                }
                step += 1;
            }
        }
    }

    let flushed = cache.close().await;
    info!("Final flush replayed {} mutations", flushed);
    info!("Cache stats: {}", serde_json::to_string(&cache.stats())?);
    info!("Demo shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
