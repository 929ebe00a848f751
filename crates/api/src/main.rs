use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use ratecraft_core::cache::TtlCache;
use ratecraft_research::ResearchApi;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ratecraft_api::background;
use ratecraft_api::config::ServerConfig;
use ratecraft_api::router::build_app_router;
use ratecraft_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ratecraft_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = ratecraft_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    ratecraft_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    ratecraft_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Benchmark cache ---
    let benchmark_cache = Arc::new(TtlCache::new(
        Duration::from_secs(config.benchmark_cache_ttl_secs),
        config.benchmark_cache_max_entries,
    ));

    // --- Research client ---
    let research = if config.research_enabled {
        match &config.research_api_url {
            Some(url) => {
                tracing::info!(url = %url, "AI research client configured");
                Some(Arc::new(ResearchApi::new(url.clone())))
            }
            None => {
                tracing::warn!("RESEARCH_API_URL not set; AI research steps will be skipped");
                None
            }
        }
    } else {
        tracing::info!("AI research disabled by configuration");
        None
    };

    // --- Background cache sweep ---
    let cancel = CancellationToken::new();
    let sweep_handle = tokio::spawn(background::cache_sweep::run(
        Arc::clone(&benchmark_cache),
        Duration::from_secs(config.cache_sweep_interval_secs),
        cancel.clone(),
    ));

    // --- Application state & router ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        benchmark_cache,
        research,
    };
    let app = build_app_router(state, &config);

    // --- Serve ---
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid HOST/PORT combination");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(%addr, "Ratecraft API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Shutdown ---
    cancel.cancel();
    let _ = sweep_handle.await;
    tracing::info!("Shutdown complete");
}

/// Resolve when the process receives SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
