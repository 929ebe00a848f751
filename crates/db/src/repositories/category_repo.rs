//! Repository for the `categories` table.

use ratecraft_core::types::DbId;
use sqlx::PgPool;

use crate::models::category::Category;

/// Column list for `categories` queries.
const COLUMNS: &str = "id, name, slug, created_at";

/// Provides lookups for the category registry.
pub struct CategoryRepo;

impl CategoryRepo {
    /// Every registered category, ordered by name.
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories ORDER BY name");
        sqlx::query_as::<_, Category>(&query).fetch_all(pool).await
    }

    /// Case-insensitive substring search on category names.
    pub async fn find_by_name_like(
        pool: &PgPool,
        fragment: &str,
    ) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories \
             WHERE name ILIKE '%' || $1 || '%' \
             ORDER BY name"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(fragment)
            .fetch_all(pool)
            .await
    }

    /// Find a category by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
