//! Repository for the `profile_categories` association table.
//!
//! The store exposes no multi-row transactions, so swapping a profile's
//! skill categories runs as a saga: snapshot, delete, insert, and a
//! best-effort compensating re-insert on partial failure. The tri-state
//! [`SwapOutcome`] lets callers distinguish a clean rollback from true
//! data inconsistency.

use ratecraft_core::types::DbId;
use serde::Serialize;
use sqlx::PgPool;

/// Outcome of a category swap saga.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapOutcome {
    /// The new category set is fully in place.
    Committed,
    /// The insert failed but the previous set was restored.
    RolledBack,
    /// The insert failed and the compensating re-insert also failed; the
    /// association table no longer reflects either state.
    Inconsistent,
}

/// Provides operations on the profile↔category association.
pub struct ProfileCategoryRepo;

impl ProfileCategoryRepo {
    /// Category IDs currently associated with a profile.
    pub async fn find_category_ids(
        pool: &PgPool,
        profile_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT category_id FROM profile_categories \
             WHERE profile_id = $1 \
             ORDER BY category_id",
        )
        .bind(profile_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Insert associations for all given category IDs.
    async fn insert_all(
        pool: &PgPool,
        profile_id: DbId,
        category_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        if category_ids.is_empty() {
            return Ok(());
        }
        sqlx::query(
            "INSERT INTO profile_categories (profile_id, category_id) \
             SELECT $1, unnest($2::bigint[]) \
             ON CONFLICT DO NOTHING",
        )
        .bind(profile_id)
        .bind(category_ids)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Replace a profile's category set with `category_ids`.
    ///
    /// Delete-then-insert with a compensating re-insert of the snapshot on
    /// insert failure. A failure of the initial snapshot or delete bubbles
    /// up as a plain store error; only the insert phase enters the saga.
    pub async fn swap_categories(
        pool: &PgPool,
        profile_id: DbId,
        category_ids: &[DbId],
    ) -> Result<SwapOutcome, sqlx::Error> {
        let snapshot = Self::find_category_ids(pool, profile_id).await?;

        sqlx::query("DELETE FROM profile_categories WHERE profile_id = $1")
            .bind(profile_id)
            .execute(pool)
            .await?;

        match Self::insert_all(pool, profile_id, category_ids).await {
            Ok(()) => Ok(SwapOutcome::Committed),
            Err(insert_err) => {
                tracing::warn!(
                    profile_id,
                    error = %insert_err,
                    "Category swap insert failed; attempting rollback"
                );
                match Self::insert_all(pool, profile_id, &snapshot).await {
                    Ok(()) => Ok(SwapOutcome::RolledBack),
                    Err(rollback_err) => {
                        tracing::error!(
                            profile_id,
                            error = %rollback_err,
                            "Category swap rollback failed; associations are inconsistent"
                        );
                        Ok(SwapOutcome::Inconsistent)
                    }
                }
            }
        }
    }
}
