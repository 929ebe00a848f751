//! Periodic purge of expired benchmark cache entries.
//!
//! Expired entries are already treated as misses on read; the sweep keeps
//! the map from accumulating dead entries between reads. Runs on a fixed
//! interval using `tokio::time::interval`.

use std::sync::Arc;
use std::time::Duration;

use ratecraft_core::cache::TtlCache;
use ratecraft_db::models::market_benchmark::MarketBenchmark;
use tokio_util::sync::CancellationToken;

/// Run the cache sweep loop until `cancel` is triggered.
pub async fn run(
    cache: Arc<TtlCache<MarketBenchmark>>,
    sweep_interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        interval_secs = sweep_interval.as_secs(),
        "Benchmark cache sweep started"
    );

    let mut interval = tokio::time::interval(sweep_interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Benchmark cache sweep stopping");
                break;
            }
            _ = interval.tick() => {
                let purged = cache.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, remaining = cache.len(), "Purged expired cache entries");
                }
            }
        }
    }
}
