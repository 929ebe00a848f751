//! Repository for the `market_benchmarks` table.

use ratecraft_core::types::DbId;
use sqlx::PgPool;

use crate::models::market_benchmark::{MarketBenchmark, UpsertMarketBenchmark};

/// Column list for `market_benchmarks` queries.
const COLUMNS: &str = "id, category_id, seniority_level, median_hourly_rate, \
     percentile_75_rate, sample_size, region, last_updated";

/// Provides lookups and upserts for market benchmarks.
pub struct MarketBenchmarkRepo;

impl MarketBenchmarkRepo {
    /// Find the benchmark for one category and seniority.
    pub async fn find_by_category_and_seniority(
        pool: &PgPool,
        category_id: DbId,
        seniority_level: &str,
    ) -> Result<Option<MarketBenchmark>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM market_benchmarks \
             WHERE category_id = $1 AND seniority_level = $2"
        );
        sqlx::query_as::<_, MarketBenchmark>(&query)
            .bind(category_id)
            .bind(seniority_level)
            .fetch_optional(pool)
            .await
    }

    /// Batched lookup for many categories at one seniority, avoiding N+1
    /// round-trips. Missing combinations are simply absent from the result.
    pub async fn find_by_categories_and_seniority(
        pool: &PgPool,
        category_ids: &[DbId],
        seniority_level: &str,
    ) -> Result<Vec<MarketBenchmark>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM market_benchmarks \
             WHERE category_id = ANY($1) AND seniority_level = $2"
        );
        sqlx::query_as::<_, MarketBenchmark>(&query)
            .bind(category_ids)
            .bind(seniority_level)
            .fetch_all(pool)
            .await
    }

    /// All benchmarks for one category, across seniority levels.
    pub async fn find_by_category(
        pool: &PgPool,
        category_id: DbId,
    ) -> Result<Vec<MarketBenchmark>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM market_benchmarks \
             WHERE category_id = $1 \
             ORDER BY seniority_level"
        );
        sqlx::query_as::<_, MarketBenchmark>(&query)
            .bind(category_id)
            .fetch_all(pool)
            .await
    }

    /// All benchmarks for one region.
    pub async fn find_by_region(
        pool: &PgPool,
        region: &str,
    ) -> Result<Vec<MarketBenchmark>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM market_benchmarks \
             WHERE region = $1 \
             ORDER BY category_id, seniority_level"
        );
        sqlx::query_as::<_, MarketBenchmark>(&query)
            .bind(region)
            .fetch_all(pool)
            .await
    }

    /// Every benchmark row.
    pub async fn find_all(pool: &PgPool) -> Result<Vec<MarketBenchmark>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM market_benchmarks ORDER BY category_id, seniority_level"
        );
        sqlx::query_as::<_, MarketBenchmark>(&query)
            .fetch_all(pool)
            .await
    }

    /// Insert or refresh the benchmark for `(category, seniority)`.
    pub async fn upsert(
        pool: &PgPool,
        data: &UpsertMarketBenchmark,
    ) -> Result<MarketBenchmark, sqlx::Error> {
        let query = format!(
            "INSERT INTO market_benchmarks \
             (category_id, seniority_level, median_hourly_rate, percentile_75_rate, \
              sample_size, region, last_updated) \
             VALUES ($1, $2, $3, $4, $5, $6, now()) \
             ON CONFLICT ON CONSTRAINT uq_market_benchmarks_category_seniority \
             DO UPDATE SET \
                 median_hourly_rate = EXCLUDED.median_hourly_rate, \
                 percentile_75_rate = EXCLUDED.percentile_75_rate, \
                 sample_size = EXCLUDED.sample_size, \
                 region = EXCLUDED.region, \
                 last_updated = now() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MarketBenchmark>(&query)
            .bind(data.category_id)
            .bind(&data.seniority_level)
            .bind(data.median_hourly_rate)
            .bind(data.percentile_75_rate)
            .bind(data.sample_size)
            .bind(&data.region)
            .fetch_one(pool)
            .await
    }
}
