//! Database operations for `leads`.

use chrono::{DateTime, Utc};
use revos_core::LeadStatus;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `leads` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LeadRow {
    pub id: i64,
    pub public_id: Uuid,
    pub tenant_id: Uuid,
    pub author_id: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_url: Option<String>,
    pub email: Option<String>,
    pub status: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for a lead upsert, keyed by `(tenant_id, author_id)`.
#[derive(Debug, Clone)]
pub struct LeadUpsert {
    pub tenant_id: Uuid,
    pub author_id: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_url: Option<String>,
    pub email: Option<String>,
    pub status: LeadStatus,
    pub source: String,
}

// Rank expression for the monotonic status advance. Keep in sync with
// LeadStatus::rank.
const STATUS_RANK: &str = "CASE {} \
     WHEN 'new' THEN 0 \
     WHEN 'connection_pending' THEN 1 \
     WHEN 'dm_sent' THEN 2 \
     WHEN 'email_captured' THEN 3 \
     ELSE 0 END";

fn rank_expr(column: &str) -> String {
    STATUS_RANK.replace("{}", column)
}

/// Inserts or updates the lead for an author. Concurrent writers converge:
/// the status only ever advances (per [`LeadStatus::rank`]), a captured
/// email is never overwritten with NULL, and blank incoming name fields
/// keep the stored values.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_lead(pool: &PgPool, lead: &LeadUpsert) -> Result<LeadRow, DbError> {
    let public_id = Uuid::new_v4();
    let excluded_rank = rank_expr("EXCLUDED.status");
    let current_rank = rank_expr("leads.status");

    let sql = format!(
        "INSERT INTO leads \
             (public_id, tenant_id, author_id, first_name, last_name, \
              profile_url, email, status, source) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         ON CONFLICT (tenant_id, author_id) DO UPDATE SET \
             first_name  = COALESCE(NULLIF(EXCLUDED.first_name, ''), leads.first_name), \
             last_name   = COALESCE(NULLIF(EXCLUDED.last_name, ''), leads.last_name), \
             profile_url = COALESCE(EXCLUDED.profile_url, leads.profile_url), \
             email       = COALESCE(EXCLUDED.email, leads.email), \
             status      = CASE WHEN {excluded_rank} > {current_rank} \
                           THEN EXCLUDED.status ELSE leads.status END, \
             updated_at  = NOW() \
         RETURNING id, public_id, tenant_id, author_id, first_name, last_name, \
                   profile_url, email, status, source, created_at, updated_at"
    );

    let row = sqlx::query_as::<_, LeadRow>(&sql)
        .bind(public_id)
        .bind(lead.tenant_id)
        .bind(&lead.author_id)
        .bind(&lead.first_name)
        .bind(&lead.last_name)
        .bind(lead.profile_url.as_deref())
        .bind(lead.email.as_deref())
        .bind(lead.status.as_str())
        .bind(&lead.source)
        .fetch_one(pool)
        .await?;

    Ok(row)
}
