//! Database operations for the `processed_comments` idempotency ledger.

use std::collections::HashSet;

use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Input for a ledger write. One row per examined comment, written after
/// branch execution regardless of side-effect success; comments without a
/// trigger match are written with `matched_word = None` so they are never
/// re-evaluated.
#[derive(Debug, Clone)]
pub struct NewProcessedComment {
    pub tenant_id: Uuid,
    pub campaign_id: Uuid,
    pub comment_id: String,
    pub post_id: Uuid,
    pub author_id: String,
    pub dm_queued: bool,
    pub matched_word: Option<String>,
}

/// Bulk-fetches the ids of every comment already processed for a
/// campaign. Read once per job cycle to avoid a per-comment round trip.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn processed_comment_ids(
    pool: &PgPool,
    tenant_id: Uuid,
    campaign_id: Uuid,
) -> Result<HashSet<String>, DbError> {
    let ids: Vec<String> = sqlx::query_scalar(
        "SELECT comment_id FROM processed_comments \
         WHERE tenant_id = $1 AND campaign_id = $2",
    )
    .bind(tenant_id)
    .bind(campaign_id)
    .fetch_all(pool)
    .await?;

    Ok(ids.into_iter().collect())
}

/// Appends a ledger row. The unique `(campaign_id, comment_id)` index
/// makes the insert a no-op when another worker got there first; that
/// lost race surfaces as `false` and is not an error.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn mark_processed(pool: &PgPool, new: &NewProcessedComment) -> Result<bool, DbError> {
    let result = sqlx::query(
        "INSERT INTO processed_comments \
             (tenant_id, campaign_id, comment_id, post_id, author_id, dm_queued, matched_word) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (campaign_id, comment_id) DO NOTHING",
    )
    .bind(new.tenant_id)
    .bind(new.campaign_id)
    .bind(&new.comment_id)
    .bind(new.post_id)
    .bind(&new.author_id)
    .bind(new.dm_queued)
    .bind(new.matched_word.as_deref())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}
