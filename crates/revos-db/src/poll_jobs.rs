//! Database operations for `poll_jobs`.
//!
//! Every cross-worker coordination point lives here as a single
//! conditional `UPDATE`: claiming a job, reclaiming stale locks, and the
//! consecutive-failure increment. Callers observe the outcome through
//! `rows_affected` or the `RETURNING` clause, never through a separate
//! read-then-write pair.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `poll_jobs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PollJobRow {
    pub id: i64,
    pub public_id: Uuid,
    pub tenant_id: Uuid,
    pub campaign_id: Uuid,
    pub post_id: Uuid,
    pub external_post_id: String,
    pub external_account_id: String,
    pub trigger_word: String,
    pub lead_magnet_name: String,
    pub status: String,
    pub error_count: i32,
    pub last_error_message: Option<String>,
    pub last_error_at: Option<DateTime<Utc>>,
    pub next_check_at: DateTime<Utc>,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub comments_scanned: i64,
    pub triggers_found: i64,
    pub messages_sent: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a new watch on a published post.
#[derive(Debug, Clone)]
pub struct NewPollJob {
    pub tenant_id: Uuid,
    pub campaign_id: Uuid,
    pub post_id: Uuid,
    pub external_post_id: String,
    pub external_account_id: String,
    pub trigger_word: String,
    pub lead_magnet_name: String,
}

/// Per-cycle metric deltas folded into the cumulative job counters on
/// completion.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleMetrics {
    pub comments_scanned: i64,
    pub triggers_found: i64,
    pub messages_sent: i64,
}

/// Result of the atomic failure increment.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FailureOutcome {
    /// Error count after the increment.
    pub error_count: i32,
    /// Job status after the increment: `scheduled` or `failed`.
    pub status: String,
}

const JOB_COLUMNS: &str = "id, public_id, tenant_id, campaign_id, post_id, external_post_id, \
     external_account_id, trigger_word, lead_magnet_name, status, error_count, \
     last_error_message, last_error_at, next_check_at, last_checked_at, \
     comments_scanned, triggers_found, messages_sent, created_at, updated_at";

// ---------------------------------------------------------------------------
// Job lifecycle
// ---------------------------------------------------------------------------

/// Creates a poll job in `scheduled` status, due immediately.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including a unique
/// violation when the (campaign, post, account) tuple is already watched).
pub async fn create_poll_job(pool: &PgPool, new: &NewPollJob) -> Result<PollJobRow, DbError> {
    let public_id = Uuid::new_v4();

    let row = sqlx::query_as::<_, PollJobRow>(&format!(
        "INSERT INTO poll_jobs \
             (public_id, tenant_id, campaign_id, post_id, external_post_id, \
              external_account_id, trigger_word, lead_magnet_name) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING {JOB_COLUMNS}"
    ))
    .bind(public_id)
    .bind(new.tenant_id)
    .bind(new.campaign_id)
    .bind(new.post_id)
    .bind(&new.external_post_id)
    .bind(&new.external_account_id)
    .bind(&new.trigger_word)
    .bind(&new.lead_magnet_name)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns all jobs due for polling: `scheduled`, past their
/// `next_check_at`, and carrying a non-empty trigger word. Jobs without a
/// trigger word are excluded by construction, not by caller convention.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_due_jobs(pool: &PgPool) -> Result<Vec<PollJobRow>, DbError> {
    let rows = sqlx::query_as::<_, PollJobRow>(&format!(
        "SELECT {JOB_COLUMNS} \
         FROM poll_jobs \
         WHERE status = 'scheduled' \
           AND next_check_at <= NOW() \
           AND btrim(trigger_word) <> '' \
         ORDER BY next_check_at, id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Attempts to exclusively claim a job for this worker.
///
/// The transition fires only where the current status is exactly
/// `scheduled`; zero affected rows means another worker won the race and
/// the caller must walk away without side effects.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn claim_job(pool: &PgPool, id: i64, tenant_id: Uuid) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE poll_jobs \
         SET status = 'running', last_checked_at = NOW(), updated_at = NOW() \
         WHERE id = $1 AND tenant_id = $2 AND status = 'scheduled'",
    )
    .bind(id)
    .bind(tenant_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Resets jobs stuck in `running` longer than `stale_after_minutes` back
/// to `scheduled`, recovering locks abandoned by crashed workers. Returns
/// the number of jobs reclaimed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn reclaim_stale_jobs(pool: &PgPool, stale_after_minutes: i64) -> Result<u64, DbError> {
    let result = sqlx::query(
        "UPDATE poll_jobs \
         SET status = 'scheduled', updated_at = NOW() \
         WHERE status = 'running' \
           AND (last_checked_at IS NULL \
                OR last_checked_at < NOW() - make_interval(mins => $1::int))",
    )
    .bind(stale_after_minutes)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Completes a cycle: returns the job to `scheduled` with a future
/// `next_check_at`, resets the consecutive error count, and folds the
/// cycle's metric deltas into the cumulative counters.
///
/// # Errors
///
/// Returns [`DbError::InvalidJobTransition`] if the job was not in
/// `running` (e.g. a stale reclaim fired mid-cycle), or [`DbError::Sqlx`]
/// if the update fails.
pub async fn complete_job(
    pool: &PgPool,
    id: i64,
    tenant_id: Uuid,
    poll_interval_minutes: i64,
    metrics: CycleMetrics,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE poll_jobs \
         SET status = 'scheduled', \
             error_count = 0, \
             next_check_at = NOW() + make_interval(mins => $3::int), \
             comments_scanned = comments_scanned + $4, \
             triggers_found = triggers_found + $5, \
             messages_sent = messages_sent + $6, \
             updated_at = NOW() \
         WHERE id = $1 AND tenant_id = $2 AND status = 'running'",
    )
    .bind(id)
    .bind(tenant_id)
    .bind(poll_interval_minutes)
    .bind(metrics.comments_scanned)
    .bind(metrics.triggers_found)
    .bind(metrics.messages_sent)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidJobTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Failure accounting
// ---------------------------------------------------------------------------

/// Atomically increments a job's consecutive error count and computes the
/// resulting status server-side.
///
/// The status becomes `failed` (permanent, never rescheduled) only when
/// the error is not-found-class and the incremented count reaches
/// `fail_threshold`; otherwise the job returns to `scheduled` for another
/// attempt after the normal poll delay. A single statement, so two workers
/// racing on the same job cannot lose an increment.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the job row does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn record_job_failure(
    pool: &PgPool,
    id: i64,
    tenant_id: Uuid,
    error_message: &str,
    is_not_found: bool,
    fail_threshold: i32,
    retry_delay_minutes: i64,
) -> Result<FailureOutcome, DbError> {
    let outcome = sqlx::query_as::<_, FailureOutcome>(
        "UPDATE poll_jobs \
         SET error_count = error_count + 1, \
             last_error_message = $3, \
             last_error_at = NOW(), \
             status = CASE \
                 WHEN $4 AND error_count + 1 >= $5 THEN 'failed' \
                 ELSE 'scheduled' \
             END, \
             next_check_at = NOW() + make_interval(mins => $6::int), \
             updated_at = NOW() \
         WHERE id = $1 AND tenant_id = $2 \
         RETURNING error_count, status",
    )
    .bind(id)
    .bind(tenant_id)
    .bind(error_message)
    .bind(is_not_found)
    .bind(fail_threshold)
    .bind(retry_delay_minutes)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(outcome)
}

/// Non-atomic fallback when [`record_job_failure`] itself errors: stamps
/// the error message and returns the job to `scheduled` without touching
/// the counter-to-threshold logic. Losing an increment here is acceptable;
/// losing the job in `running` is not.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if even the plain update fails; callers are
/// expected to log and swallow this.
pub async fn record_job_failure_best_effort(
    pool: &PgPool,
    id: i64,
    tenant_id: Uuid,
    error_message: &str,
    retry_delay_minutes: i64,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE poll_jobs \
         SET last_error_message = $3, \
             last_error_at = NOW(), \
             status = 'scheduled', \
             next_check_at = NOW() + make_interval(mins => $4::int), \
             updated_at = NOW() \
         WHERE id = $1 AND tenant_id = $2 AND status <> 'failed'",
    )
    .bind(id)
    .bind(tenant_id)
    .bind(error_message)
    .bind(retry_delay_minutes)
    .execute(pool)
    .await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Operator queries
// ---------------------------------------------------------------------------

/// Fetches a single job by its `public_id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn get_job_by_public_id(pool: &PgPool, public_id: Uuid) -> Result<PollJobRow, DbError> {
    let row = sqlx::query_as::<_, PollJobRow>(&format!(
        "SELECT {JOB_COLUMNS} FROM poll_jobs WHERE public_id = $1"
    ))
    .bind(public_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Returns the most recent `limit` jobs, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_jobs(pool: &PgPool, limit: i64) -> Result<Vec<PollJobRow>, DbError> {
    let rows = sqlx::query_as::<_, PollJobRow>(&format!(
        "SELECT {JOB_COLUMNS} \
         FROM poll_jobs \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a permanently `failed` job to `scheduled` after operator
/// intervention, clearing its error count. True if a row transitioned.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn reset_failed_job(pool: &PgPool, public_id: Uuid) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE poll_jobs \
         SET status = 'scheduled', error_count = 0, last_error_message = NULL, \
             next_check_at = NOW(), updated_at = NOW() \
         WHERE public_id = $1 AND status = 'failed'",
    )
    .bind(public_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}
