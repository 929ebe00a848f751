/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Base URL of the AI research service, if configured.
    pub research_api_url: Option<String>,
    /// Master switch for the AI research integration (default: `true`).
    /// When off, research steps report `ai_status = skipped`.
    pub research_enabled: bool,
    /// Benchmark cache entry TTL in seconds (default: `300`).
    pub benchmark_cache_ttl_secs: u64,
    /// Benchmark cache capacity (default: `1000` entries).
    pub benchmark_cache_max_entries: usize,
    /// Interval between expired-entry sweeps in seconds (default: `60`).
    pub cache_sweep_interval_secs: u64,
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: &str, what: &str) -> T {
    std::env::var(key)
        .unwrap_or_else(|_| default.into())
        .parse()
        .unwrap_or_else(|_| panic!("{key} must be a valid {what}"))
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                 |
    /// |-------------------------------|-------------------------|
    /// | `HOST`                        | `0.0.0.0`               |
    /// | `PORT`                        | `3000`                  |
    /// | `CORS_ORIGINS`                | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                    |
    /// | `RESEARCH_API_URL`            | unset                   |
    /// | `RESEARCH_ENABLED`            | `true`                  |
    /// | `BENCHMARK_CACHE_TTL_SECS`    | `300`                   |
    /// | `BENCHMARK_CACHE_MAX_ENTRIES` | `1000`                  |
    /// | `CACHE_SWEEP_INTERVAL_SECS`   | `60`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let research_api_url = std::env::var("RESEARCH_API_URL")
            .ok()
            .map(|s| s.trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());

        let research_enabled = std::env::var("RESEARCH_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        Self {
            host,
            port: env_parsed("PORT", "3000", "u16"),
            cors_origins,
            request_timeout_secs: env_parsed("REQUEST_TIMEOUT_SECS", "30", "u64"),
            research_api_url,
            research_enabled,
            benchmark_cache_ttl_secs: env_parsed("BENCHMARK_CACHE_TTL_SECS", "300", "u64"),
            benchmark_cache_max_entries: env_parsed("BENCHMARK_CACHE_MAX_ENTRIES", "1000", "usize"),
            cache_sweep_interval_secs: env_parsed("CACHE_SWEEP_INTERVAL_SECS", "60", "u64"),
        }
    }
}
