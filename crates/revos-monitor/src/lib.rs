//! Engagement trigger and funnel orchestration engine.
//!
//! Watches externally hosted posts for new comments, detects
//! campaign-defined trigger words, and drives a three-branch outreach
//! funnel (email capture, connected DM, reply + connection request) with
//! at-most-once local processing per comment across concurrent workers.
//!
//! The subsystem exposes no network surface of its own: an external timer
//! invokes [`run_poll_cycle`] with a [`FunnelStore`] and the platform
//! collaborators from `revos-social`.

pub mod budget;
pub mod cycle;
pub mod error;
mod failure;
pub mod funnel;
pub mod store;
pub mod trigger;

pub use cycle::{run_poll_cycle, CycleSummary, PollDeps};
pub use error::MonitorError;
pub use store::{FunnelStore, PgFunnelStore};
