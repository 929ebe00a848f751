//! Market benchmark entity model and DTOs.

use ratecraft_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `market_benchmarks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MarketBenchmark {
    pub id: DbId,
    pub category_id: DbId,
    pub seniority_level: String,
    pub median_hourly_rate: f64,
    pub percentile_75_rate: f64,
    pub sample_size: i32,
    pub region: String,
    pub last_updated: Timestamp,
}

/// DTO for inserting or refreshing a benchmark row.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertMarketBenchmark {
    pub category_id: DbId,
    pub seniority_level: String,
    pub median_hourly_rate: f64,
    pub percentile_75_rate: f64,
    pub sample_size: i32,
    pub region: String,
}
