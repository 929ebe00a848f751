//! HTTP request handlers, one module per resource.

pub mod benchmarks;
pub mod onboarding;
pub mod portfolio;
pub mod rates;

use ratecraft_core::similarity::{self, DEFAULT_MATCH_THRESHOLD};
use ratecraft_core::types::DbId;
use ratecraft_db::repositories::CategoryRepo;

use crate::error::AppResult;

/// Fuzzy-resolve free-form category names against the registry.
///
/// Names that match no category above the threshold are dropped; the
/// returned IDs are deduplicated in first-match order.
pub(crate) async fn resolve_category_ids(
    pool: &sqlx::PgPool,
    names: &[String],
) -> AppResult<Vec<DbId>> {
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let catalog = CategoryRepo::find_all(pool).await?;
    let mut resolved: Vec<DbId> = Vec::new();

    for name in names {
        let found = similarity::best_match(
            name,
            catalog.iter().map(|c| c.name.as_str()),
            DEFAULT_MATCH_THRESHOLD,
        );
        if let Some(m) = found {
            let id = catalog[m.index].id;
            if !resolved.contains(&id) {
                resolved.push(id);
            }
        } else {
            tracing::debug!(name = %name, "No category matched above threshold");
        }
    }

    Ok(resolved)
}
