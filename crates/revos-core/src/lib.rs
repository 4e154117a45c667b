use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid lead status: {0}")]
    InvalidLeadStatus(String),
}

/// Funnel position of a lead. Advances monotonically within the funnel;
/// a later campaign may run the same author through the funnel again but
/// never demotes the stored status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    ConnectionPending,
    DmSent,
    EmailCaptured,
}

impl LeadStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::ConnectionPending => "connection_pending",
            LeadStatus::DmSent => "dm_sent",
            LeadStatus::EmailCaptured => "email_captured",
        }
    }

    /// Ordering used for the monotonic-advance upsert. Higher rank wins.
    #[must_use]
    pub fn rank(self) -> i16 {
        match self {
            LeadStatus::New => 0,
            LeadStatus::ConnectionPending => 1,
            LeadStatus::DmSent => 2,
            LeadStatus::EmailCaptured => 3,
        }
    }

    /// Parses the storage form.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidLeadStatus`] for anything outside the
    /// four storage values.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "new" => Ok(LeadStatus::New),
            "connection_pending" => Ok(LeadStatus::ConnectionPending),
            "dm_sent" => Ok(LeadStatus::DmSent),
            "email_captured" => Ok(LeadStatus::EmailCaptured),
            other => Err(CoreError::InvalidLeadStatus(other.to_owned())),
        }
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub mod config;

pub use config::MonitorConfig;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lead_status_round_trips_through_storage_form() {
        for status in [
            LeadStatus::New,
            LeadStatus::ConnectionPending,
            LeadStatus::DmSent,
            LeadStatus::EmailCaptured,
        ] {
            assert_eq!(LeadStatus::parse(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn lead_status_rank_orders_the_funnel() {
        assert!(LeadStatus::New.rank() < LeadStatus::ConnectionPending.rank());
        assert!(LeadStatus::ConnectionPending.rank() < LeadStatus::DmSent.rank());
        assert!(LeadStatus::DmSent.rank() < LeadStatus::EmailCaptured.rank());
    }

    #[test]
    fn lead_status_parse_rejects_unknown_value() {
        assert!(matches!(
            LeadStatus::parse("archived"),
            Err(CoreError::InvalidLeadStatus(_))
        ));
    }
}
