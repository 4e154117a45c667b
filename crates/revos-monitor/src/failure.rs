//! Failure accounting and operator alerting for job-level errors.

use revos_core::MonitorConfig;
use revos_db::PollJobRow;
use revos_social::{Alerter, Severity};

use crate::error::MonitorError;
use crate::store::FunnelStore;

/// Status value a permanently disabled job lands on.
const STATUS_FAILED: &str = "failed";

/// Alert on non-not-found errors from the second consecutive occurrence.
const REPEAT_ALERT_THRESHOLD: i32 = 2;

/// Routes a job-level error through the atomic failure increment, alerts
/// the operator where policy says so, and never propagates: a failing job
/// must not take the rest of the poll invocation down with it.
pub(crate) async fn handle_job_failure(
    store: &dyn FunnelStore,
    alerter: &dyn Alerter,
    config: &MonitorConfig,
    job: &PollJobRow,
    error: &MonitorError,
) {
    let is_not_found = error.is_not_found();
    let message = error.to_string();

    let outcome = match store
        .record_job_failure(
            job,
            &message,
            is_not_found,
            config.not_found_fail_threshold,
            config.poll_interval_minutes,
        )
        .await
    {
        Ok(outcome) => outcome,
        Err(db_err) => {
            tracing::warn!(
                job = %job.public_id,
                error = %db_err,
                "atomic failure accounting unavailable; falling back to best-effort update"
            );
            if let Err(fallback_err) = store
                .record_job_failure_best_effort(job, &message, config.poll_interval_minutes)
                .await
            {
                tracing::error!(
                    job = %job.public_id,
                    error = %fallback_err,
                    "best-effort failure update also failed; job may retry early"
                );
            }
            return;
        }
    };

    tracing::error!(
        job = %job.public_id,
        campaign = %job.campaign_id,
        error_count = outcome.error_count,
        status = %outcome.status,
        not_found = is_not_found,
        error = %message,
        "poll job cycle failed"
    );

    let context = serde_json::json!({
        "job": job.public_id,
        "campaign": job.campaign_id,
        "tenant": job.tenant_id,
        "external_post_id": job.external_post_id,
        "error_count": outcome.error_count,
        "error": message,
    });

    if outcome.status == STATUS_FAILED {
        alerter
            .alert(
                &format!(
                    "poll job {} permanently disabled after {} consecutive not-found errors",
                    job.public_id, outcome.error_count
                ),
                Severity::Warning,
                context,
            )
            .await;
    } else if !is_not_found && outcome.error_count >= REPEAT_ALERT_THRESHOLD {
        alerter
            .alert(
                &format!(
                    "poll job {} failing repeatedly ({} consecutive errors)",
                    job.public_id, outcome.error_count
                ),
                Severity::Warning,
                context,
            )
            .await;
    }
}
