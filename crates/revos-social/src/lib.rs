//! Interface boundary to the external social platform, email extraction,
//! and alerting collaborators.
//!
//! Concrete platform clients (REST integrations, scraping sessions) live
//! outside this workspace and are injected where the monitor is embedded.
//! This crate pins down the contracts those clients must satisfy and the
//! error taxonomy the monitor's failure handling is built on.

mod client;
mod error;
mod notify;
mod types;

pub use client::{Alerter, EmailExtractor, SocialClient};
pub use error::SocialError;
pub use notify::{LogAlerter, NoopAlerter};
pub use types::{
    Comment, ConnectionStatus, EmailConfidence, ExtractedEmail, Invitation, Severity,
};
