//! Database operations for `pending_connections`.

use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Input for recording an outbound connection request awaiting
/// acceptance. `invitation_id` is `None` when the platform reported an
/// invitation was already outstanding.
#[derive(Debug, Clone)]
pub struct NewPendingConnection {
    pub tenant_id: Uuid,
    pub campaign_id: Uuid,
    pub lead_id: i64,
    pub author_id: String,
    pub author_name: String,
    pub profile_url: Option<String>,
    pub comment_id: String,
    pub comment_text: String,
    pub post_id: Uuid,
    pub invitation_id: Option<String>,
}

/// Records a pending connection for later follow-up. Keyed by
/// `(campaign_id, author_id)`, so a second trigger comment from the same
/// author within a campaign converges onto the existing row. True if a
/// new row was written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn record_pending_connection(
    pool: &PgPool,
    new: &NewPendingConnection,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "INSERT INTO pending_connections \
             (tenant_id, campaign_id, lead_id, author_id, author_name, profile_url, \
              comment_id, comment_text, post_id, invitation_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         ON CONFLICT (campaign_id, author_id) DO NOTHING",
    )
    .bind(new.tenant_id)
    .bind(new.campaign_id)
    .bind(new.lead_id)
    .bind(&new.author_id)
    .bind(&new.author_name)
    .bind(new.profile_url.as_deref())
    .bind(&new.comment_id)
    .bind(&new.comment_text)
    .bind(new.post_id)
    .bind(new.invitation_id.as_deref())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}
