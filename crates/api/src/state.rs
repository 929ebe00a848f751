use std::sync::Arc;

use ratecraft_core::cache::TtlCache;
use ratecraft_db::models::market_benchmark::MarketBenchmark;
use ratecraft_research::ResearchApi;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: ratecraft_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Injected benchmark read cache; also swept by the background task.
    pub benchmark_cache: Arc<TtlCache<MarketBenchmark>>,
    /// AI research client. `None` when unconfigured or disabled, in which
    /// case research steps report `ai_status = skipped`.
    pub research: Option<Arc<ResearchApi>>,
}
