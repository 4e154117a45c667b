//! Poll cycle orchestration.
//!
//! One invocation sweeps stale locks, claims each due job, and walks that
//! job's unseen comments strictly in order: trigger match, funnel branch,
//! budget reservation, side effects, ledger write. Per-comment failures
//! are logged and the loop moves on; job-level failures route to the
//! failure manager; nothing escapes `run_poll_cycle`.

use std::sync::Arc;

use revos_core::MonitorConfig;
use revos_db::{
    CycleMetrics, LeadUpsert, NewPendingConnection, NewProcessedComment, PollJobRow,
};
use revos_social::{Alerter, Comment, ConnectionStatus, EmailExtractor, SocialClient};

use crate::budget::CycleBudget;
use crate::error::MonitorError;
use crate::failure;
use crate::funnel::{self, templates, FunnelBranch};
use crate::store::FunnelStore;
use crate::trigger;

/// Source tag stamped onto leads created by this subsystem.
const LEAD_SOURCE: &str = "comment_funnel";

/// External collaborators injected by the embedding application.
pub struct PollDeps {
    pub social: Arc<dyn SocialClient>,
    pub email_extractor: Arc<dyn EmailExtractor>,
    pub alerter: Arc<dyn Alerter>,
}

/// What one poll invocation did, for logging and operator visibility.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleSummary {
    pub stale_reclaimed: u64,
    pub jobs_due: usize,
    pub jobs_processed: usize,
    /// Jobs skipped on claim contention. Not an error.
    pub jobs_skipped: usize,
    pub jobs_failed: usize,
    pub comments_scanned: i64,
    pub triggers_found: i64,
    pub messages_sent: i64,
}

/// Runs one full poll cycle over every due job. The single entry point of
/// this subsystem; invoked by an external timer, safe to run concurrently
/// from multiple workers.
pub async fn run_poll_cycle(
    store: &dyn FunnelStore,
    deps: &PollDeps,
    config: &MonitorConfig,
) -> CycleSummary {
    let mut summary = CycleSummary::default();

    match store.reclaim_stale_jobs(config.stale_after_minutes).await {
        Ok(0) => {}
        Ok(reclaimed) => {
            tracing::warn!(reclaimed, "reclaimed poll jobs abandoned by crashed workers");
            summary.stale_reclaimed = reclaimed;
        }
        Err(e) => tracing::error!(error = %e, "stale job sweep failed"),
    }

    let due = match store.list_due_jobs().await {
        Ok(due) => due,
        Err(e) => {
            tracing::error!(error = %e, "failed to list due poll jobs");
            return summary;
        }
    };
    summary.jobs_due = due.len();

    for job in &due {
        match store.claim_job(job).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(job = %job.public_id, "claim lost to another worker; skipping");
                summary.jobs_skipped += 1;
                continue;
            }
            Err(e) => {
                tracing::error!(job = %job.public_id, error = %e, "claim attempt failed");
                summary.jobs_skipped += 1;
                continue;
            }
        }

        match process_job(store, deps, config, job).await {
            Ok(metrics) => {
                summary.jobs_processed += 1;
                summary.comments_scanned += metrics.comments_scanned;
                summary.triggers_found += metrics.triggers_found;
                summary.messages_sent += metrics.messages_sent;

                if let Err(e) = store
                    .complete_job(job, config.poll_interval_minutes, metrics)
                    .await
                {
                    tracing::error!(job = %job.public_id, error = %e, "failed to complete poll job");
                }
            }
            Err(error) => {
                summary.jobs_failed += 1;
                failure::handle_job_failure(store, deps.alerter.as_ref(), config, job, &error)
                    .await;
            }
        }
    }

    tracing::info!(
        jobs_due = summary.jobs_due,
        jobs_processed = summary.jobs_processed,
        jobs_skipped = summary.jobs_skipped,
        jobs_failed = summary.jobs_failed,
        comments_scanned = summary.comments_scanned,
        triggers_found = summary.triggers_found,
        messages_sent = summary.messages_sent,
        "poll cycle complete"
    );

    summary
}

/// One claimed job's cycle: fetch, dedup against the ledger, and process
/// unseen comments sequentially until done or the rate budget runs out.
async fn process_job(
    store: &dyn FunnelStore,
    deps: &PollDeps,
    config: &MonitorConfig,
    job: &PollJobRow,
) -> Result<CycleMetrics, MonitorError> {
    let comments = deps
        .social
        .fetch_comments(&job.external_account_id, &job.external_post_id)
        .await?;

    let mut metrics = CycleMetrics::default();
    if comments.is_empty() {
        return Ok(metrics);
    }

    // One bulk ledger read per cycle instead of a per-comment round trip.
    let seen = store
        .processed_comment_ids(job.tenant_id, job.campaign_id)
        .await?;

    let mut budget = CycleBudget::new(config);

    for comment in &comments {
        if seen.contains(&comment.id) {
            continue;
        }
        metrics.comments_scanned += 1;

        let Some(matched) = trigger::match_trigger(&comment.text, &job.trigger_word) else {
            // Recorded with no matched word so it is never re-evaluated.
            mark_processed(store, job, comment, false, None).await;
            continue;
        };
        metrics.triggers_found += 1;
        tracing::info!(
            job = %job.public_id,
            comment = %comment.id,
            author = %comment.author_id,
            trigger = matched,
            "trigger word matched"
        );

        let email = deps
            .email_extractor
            .extract(&comment.text)
            .filter(|e| e.confidence.is_actionable());

        // The email branch ignores connection state, so only probe the
        // platform when the decision actually depends on it.
        let connection = if email.is_some() {
            ConnectionStatus::default()
        } else {
            match deps
                .social
                .check_connection_status(&job.external_account_id, &comment.author_id)
                .await
            {
                Ok(status) => status,
                Err(e) => {
                    tracing::warn!(
                        job = %job.public_id,
                        comment = %comment.id,
                        error = %e,
                        "connection status check failed; comment will retry next cycle"
                    );
                    continue;
                }
            }
        };

        let branch = funnel::decide_branch(email.as_ref(), connection);

        let (replies, dms, invites) = branch.budget_needs();
        if !budget.reserve(replies, dms, invites) {
            tracing::info!(
                job = %job.public_id,
                replies_remaining = budget.replies_remaining(),
                dms_remaining = budget.dms_remaining(),
                invites_remaining = budget.connection_requests_remaining(),
                "rate budget exhausted; deferring remaining comments to next cycle"
            );
            break;
        }

        let dm_queued = execute_branch(store, deps, job, comment, &branch).await;
        metrics.messages_sent += i64::from(dm_queued);

        mark_processed(store, job, comment, dm_queued, Some(matched)).await;
    }

    Ok(metrics)
}

/// Executes one funnel branch. Side-effect failures are logged, never
/// propagated: the comment is marked processed regardless, because
/// re-attempting public, human-visible actions risks conspicuous
/// duplicates on the platform. Returns whether a DM was actually sent.
async fn execute_branch(
    store: &dyn FunnelStore,
    deps: &PollDeps,
    job: &PollJobRow,
    comment: &Comment,
    branch: &FunnelBranch,
) -> bool {
    let first_name = comment.first_name().to_owned();
    let last_name = comment
        .author_name
        .split_whitespace()
        .skip(1)
        .collect::<Vec<_>>()
        .join(" ");
    let magnet = job.lead_magnet_name.as_str();

    let mut lead = LeadUpsert {
        tenant_id: job.tenant_id,
        author_id: comment.author_id.clone(),
        first_name: first_name.clone(),
        last_name,
        profile_url: comment.author_profile_url.clone(),
        email: None,
        status: branch.lead_status(),
        source: LEAD_SOURCE.to_owned(),
    };

    let mut dm_queued = false;
    let mut invitation_id = None;

    match branch {
        FunnelBranch::EmailCapture { email } => {
            lead.email = Some(email.clone());
            reply(deps, job, comment, &templates::inbox_ack(&first_name, magnet)).await;
        }
        FunnelBranch::DirectMessage => {
            match deps
                .social
                .send_direct_message(
                    &job.external_account_id,
                    &comment.author_id,
                    &templates::dm_body(&first_name, magnet),
                )
                .await
            {
                Ok(()) => dm_queued = true,
                Err(e) => {
                    tracing::warn!(
                        job = %job.public_id,
                        comment = %comment.id,
                        error = %e,
                        "direct message failed; comment stays processed without retry"
                    );
                }
            }
            reply(deps, job, comment, &templates::dm_ack(&first_name)).await;
        }
        FunnelBranch::ConnectionInvite {
            invitation_outstanding,
        } => {
            // The public reply happens first: a human-visible action must
            // land even if the invite below fails.
            reply(
                deps,
                job,
                comment,
                &templates::invite_reply(&first_name, magnet),
            )
            .await;

            if *invitation_outstanding {
                tracing::debug!(
                    job = %job.public_id,
                    author = %comment.author_id,
                    "invitation already outstanding; skipping connection request"
                );
            } else {
                match deps
                    .social
                    .send_connection_request(
                        &job.external_account_id,
                        &comment.author_id,
                        &templates::invite_note(&first_name, magnet),
                    )
                    .await
                {
                    Ok(invitation) => invitation_id = invitation.invitation_id,
                    Err(e) => {
                        tracing::warn!(
                            job = %job.public_id,
                            comment = %comment.id,
                            error = %e,
                            "connection request failed; comment stays processed without retry"
                        );
                    }
                }
            }
        }
    }

    let lead_row = match store.upsert_lead(&lead).await {
        Ok(row) => Some(row),
        Err(e) => {
            tracing::error!(
                job = %job.public_id,
                author = %comment.author_id,
                error = %e,
                "lead upsert failed"
            );
            None
        }
    };

    if let (FunnelBranch::ConnectionInvite { .. }, Some(lead_row)) = (branch, lead_row) {
        let pending = NewPendingConnection {
            tenant_id: job.tenant_id,
            campaign_id: job.campaign_id,
            lead_id: lead_row.id,
            author_id: comment.author_id.clone(),
            author_name: comment.author_name.clone(),
            profile_url: comment.author_profile_url.clone(),
            comment_id: comment.id.clone(),
            comment_text: comment.text.clone(),
            post_id: job.post_id,
            invitation_id,
        };
        if let Err(e) = store.record_pending_connection(&pending).await {
            tracing::error!(
                job = %job.public_id,
                author = %comment.author_id,
                error = %e,
                "failed to record pending connection"
            );
        }
    }

    dm_queued
}

/// Public reply helper; failures are logged and swallowed.
async fn reply(deps: &PollDeps, job: &PollJobRow, comment: &Comment, text: &str) {
    if let Err(e) = deps
        .social
        .reply_to_comment(
            &job.external_account_id,
            &job.external_post_id,
            text,
            &comment.id,
        )
        .await
    {
        tracing::warn!(
            job = %job.public_id,
            comment = %comment.id,
            error = %e,
            "public reply failed; comment stays processed without retry"
        );
    }
}

/// Idempotency-ledger write. Exactly one attempt per examined comment; a
/// lost race (another worker already wrote the row) is logged at debug.
async fn mark_processed(
    store: &dyn FunnelStore,
    job: &PollJobRow,
    comment: &Comment,
    dm_queued: bool,
    matched_word: Option<&str>,
) {
    let record = NewProcessedComment {
        tenant_id: job.tenant_id,
        campaign_id: job.campaign_id,
        comment_id: comment.id.clone(),
        post_id: job.post_id,
        author_id: comment.author_id.clone(),
        dm_queued,
        matched_word: matched_word.map(str::to_owned),
    };

    match store.mark_processed(&record).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::debug!(
                job = %job.public_id,
                comment = %comment.id,
                "comment already in the ledger (concurrent worker)"
            );
        }
        Err(e) => {
            tracing::error!(
                job = %job.public_id,
                comment = %comment.id,
                error = %e,
                "ledger write failed; comment may be re-evaluated next cycle"
            );
        }
    }
}
