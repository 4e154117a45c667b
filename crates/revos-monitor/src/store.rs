//! Persistence seam for the poll cycle.
//!
//! The orchestrator talks to a [`FunnelStore`] so the atomic transitions
//! stay behind one interface: [`PgFunnelStore`] maps them onto the
//! conditional updates in `revos-db`, and the test suite substitutes an
//! in-memory store with the same claim/increment semantics.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use revos_db::{
    CycleMetrics, DbError, FailureOutcome, LeadRow, LeadUpsert, NewPendingConnection,
    NewProcessedComment, PollJobRow,
};

/// Store operations the poll cycle needs. The claim and failure-increment
/// methods must be indivisible at the store; callers never compose them
/// from separate reads and writes.
#[async_trait]
pub trait FunnelStore: Send + Sync {
    /// Recover jobs left `running` by crashed workers. Returns how many
    /// were reset.
    async fn reclaim_stale_jobs(&self, stale_after_minutes: i64) -> Result<u64, DbError>;

    /// Jobs due for polling, oldest first.
    async fn list_due_jobs(&self) -> Result<Vec<PollJobRow>, DbError>;

    /// Exclusive claim; false means another worker won.
    async fn claim_job(&self, job: &PollJobRow) -> Result<bool, DbError>;

    /// Normal completion: back to `scheduled`, error count reset, metrics
    /// folded in.
    async fn complete_job(
        &self,
        job: &PollJobRow,
        poll_interval_minutes: i64,
        metrics: CycleMetrics,
    ) -> Result<(), DbError>;

    /// Atomic consecutive-failure increment with server-side status
    /// computation.
    async fn record_job_failure(
        &self,
        job: &PollJobRow,
        error_message: &str,
        is_not_found: bool,
        fail_threshold: i32,
        retry_delay_minutes: i64,
    ) -> Result<FailureOutcome, DbError>;

    /// Non-atomic fallback used only when the atomic path errors.
    async fn record_job_failure_best_effort(
        &self,
        job: &PollJobRow,
        error_message: &str,
        retry_delay_minutes: i64,
    ) -> Result<(), DbError>;

    /// Bulk idempotency-ledger read for one campaign.
    async fn processed_comment_ids(
        &self,
        tenant_id: Uuid,
        campaign_id: Uuid,
    ) -> Result<HashSet<String>, DbError>;

    /// Idempotency-ledger append; false on a lost race.
    async fn mark_processed(&self, new: &NewProcessedComment) -> Result<bool, DbError>;

    async fn upsert_lead(&self, lead: &LeadUpsert) -> Result<LeadRow, DbError>;

    async fn record_pending_connection(&self, new: &NewPendingConnection)
        -> Result<bool, DbError>;
}

/// Postgres-backed store used in production.
#[derive(Clone)]
pub struct PgFunnelStore {
    pool: PgPool,
}

impl PgFunnelStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FunnelStore for PgFunnelStore {
    async fn reclaim_stale_jobs(&self, stale_after_minutes: i64) -> Result<u64, DbError> {
        revos_db::reclaim_stale_jobs(&self.pool, stale_after_minutes).await
    }

    async fn list_due_jobs(&self) -> Result<Vec<PollJobRow>, DbError> {
        revos_db::list_due_jobs(&self.pool).await
    }

    async fn claim_job(&self, job: &PollJobRow) -> Result<bool, DbError> {
        revos_db::claim_job(&self.pool, job.id, job.tenant_id).await
    }

    async fn complete_job(
        &self,
        job: &PollJobRow,
        poll_interval_minutes: i64,
        metrics: CycleMetrics,
    ) -> Result<(), DbError> {
        revos_db::complete_job(
            &self.pool,
            job.id,
            job.tenant_id,
            poll_interval_minutes,
            metrics,
        )
        .await
    }

    async fn record_job_failure(
        &self,
        job: &PollJobRow,
        error_message: &str,
        is_not_found: bool,
        fail_threshold: i32,
        retry_delay_minutes: i64,
    ) -> Result<FailureOutcome, DbError> {
        revos_db::record_job_failure(
            &self.pool,
            job.id,
            job.tenant_id,
            error_message,
            is_not_found,
            fail_threshold,
            retry_delay_minutes,
        )
        .await
    }

    async fn record_job_failure_best_effort(
        &self,
        job: &PollJobRow,
        error_message: &str,
        retry_delay_minutes: i64,
    ) -> Result<(), DbError> {
        revos_db::record_job_failure_best_effort(
            &self.pool,
            job.id,
            job.tenant_id,
            error_message,
            retry_delay_minutes,
        )
        .await
    }

    async fn processed_comment_ids(
        &self,
        tenant_id: Uuid,
        campaign_id: Uuid,
    ) -> Result<HashSet<String>, DbError> {
        revos_db::processed_comment_ids(&self.pool, tenant_id, campaign_id).await
    }

    async fn mark_processed(&self, new: &NewProcessedComment) -> Result<bool, DbError> {
        revos_db::mark_processed(&self.pool, new).await
    }

    async fn upsert_lead(&self, lead: &LeadUpsert) -> Result<LeadRow, DbError> {
        revos_db::upsert_lead(&self.pool, lead).await
    }

    async fn record_pending_connection(
        &self,
        new: &NewPendingConnection,
    ) -> Result<bool, DbError> {
        revos_db::record_pending_connection(&self.pool, new).await
    }
}
