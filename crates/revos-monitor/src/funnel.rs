//! Funnel branch selection and outreach copy.
//!
//! `decide_branch` is a pure three-way decision; executing the chosen
//! branch (side effects, persistence) belongs to the cycle orchestrator.

use revos_core::LeadStatus;
use revos_social::{ConnectionStatus, ExtractedEmail};

/// One of the three mutually exclusive outreach paths for a
/// trigger-matched comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunnelBranch {
    /// The comment itself carried an email at actionable confidence:
    /// capture it and acknowledge publicly. No DM, no invite.
    EmailCapture { email: String },
    /// Author already connected: DM the lead magnet, acknowledge
    /// publicly.
    DirectMessage,
    /// Author not connected: always reply publicly, then invite unless an
    /// invitation is already outstanding.
    ConnectionInvite { invitation_outstanding: bool },
}

/// Picks the branch for a matched comment. An email at medium/high
/// confidence wins regardless of connection state.
#[must_use]
pub fn decide_branch(
    email: Option<&ExtractedEmail>,
    connection: ConnectionStatus,
) -> FunnelBranch {
    match email {
        Some(extracted) if extracted.confidence.is_actionable() => FunnelBranch::EmailCapture {
            email: extracted.email.clone(),
        },
        _ if connection.is_connected => FunnelBranch::DirectMessage,
        _ => FunnelBranch::ConnectionInvite {
            invitation_outstanding: connection.has_pending_invitation,
        },
    }
}

impl FunnelBranch {
    /// Outbound actions the branch will attempt, as
    /// `(replies, dms, connection_requests)`. Reserved against the cycle
    /// budget before the first side effect.
    #[must_use]
    pub fn budget_needs(&self) -> (u32, u32, u32) {
        match self {
            FunnelBranch::EmailCapture { .. } => (1, 0, 0),
            FunnelBranch::DirectMessage => (1, 1, 0),
            FunnelBranch::ConnectionInvite {
                invitation_outstanding,
            } => (1, 0, u32::from(!invitation_outstanding)),
        }
    }

    /// Lead status this branch advances to.
    #[must_use]
    pub fn lead_status(&self) -> LeadStatus {
        match self {
            FunnelBranch::EmailCapture { .. } => LeadStatus::EmailCaptured,
            FunnelBranch::DirectMessage => LeadStatus::DmSent,
            FunnelBranch::ConnectionInvite { .. } => LeadStatus::ConnectionPending,
        }
    }
}

/// Outreach copy, parameterised by the author's first name and the
/// campaign's lead-magnet name.
pub mod templates {
    /// Public acknowledgement for the email-capture path.
    #[must_use]
    pub fn inbox_ack(first_name: &str, lead_magnet: &str) -> String {
        format!("Thanks {first_name}! Check your inbox, {lead_magnet} is on its way.")
    }

    /// Public acknowledgement for the connected-DM path.
    #[must_use]
    pub fn dm_ack(first_name: &str) -> String {
        format!("Thanks {first_name}! Just sent you a DM with the details.")
    }

    /// Direct message body for connected authors.
    #[must_use]
    pub fn dm_body(first_name: &str, lead_magnet: &str) -> String {
        format!(
            "Hey {first_name}, thanks for your comment! Here's {lead_magnet} as promised. \
             Reply with your best email and I'll send the full version over."
        )
    }

    /// Public reply for the not-connected path.
    #[must_use]
    pub fn invite_reply(first_name: &str, lead_magnet: &str) -> String {
        format!(
            "Thanks {first_name}! I've sent you a connection request so I can \
             share {lead_magnet} with you."
        )
    }

    /// Note attached to the connection request. Platforms cap these
    /// around 300 characters, so keep it short.
    #[must_use]
    pub fn invite_note(first_name: &str, lead_magnet: &str) -> String {
        format!("Hi {first_name}, saw your comment! Connecting so I can send over {lead_magnet}.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revos_social::EmailConfidence;

    fn email(confidence: EmailConfidence) -> ExtractedEmail {
        ExtractedEmail {
            email: "jane@example.com".to_owned(),
            confidence,
        }
    }

    const CONNECTED: ConnectionStatus = ConnectionStatus {
        is_connected: true,
        has_pending_invitation: false,
    };

    const NOT_CONNECTED: ConnectionStatus = ConnectionStatus {
        is_connected: false,
        has_pending_invitation: false,
    };

    #[test]
    fn high_confidence_email_wins_regardless_of_connection_state() {
        for connection in [CONNECTED, NOT_CONNECTED] {
            let branch = decide_branch(Some(&email(EmailConfidence::High)), connection);
            assert!(matches!(branch, FunnelBranch::EmailCapture { .. }));
        }
    }

    #[test]
    fn medium_confidence_email_is_actionable() {
        let branch = decide_branch(Some(&email(EmailConfidence::Medium)), CONNECTED);
        assert_eq!(
            branch,
            FunnelBranch::EmailCapture {
                email: "jane@example.com".to_owned()
            }
        );
    }

    #[test]
    fn low_confidence_email_falls_through_to_connection_state() {
        let branch = decide_branch(Some(&email(EmailConfidence::Low)), CONNECTED);
        assert_eq!(branch, FunnelBranch::DirectMessage);

        let branch = decide_branch(Some(&email(EmailConfidence::Low)), NOT_CONNECTED);
        assert_eq!(
            branch,
            FunnelBranch::ConnectionInvite {
                invitation_outstanding: false
            }
        );
    }

    #[test]
    fn not_connected_with_outstanding_invitation_skips_the_invite() {
        let branch = decide_branch(
            None,
            ConnectionStatus {
                is_connected: false,
                has_pending_invitation: true,
            },
        );
        assert_eq!(
            branch,
            FunnelBranch::ConnectionInvite {
                invitation_outstanding: true
            }
        );
        assert_eq!(branch.budget_needs(), (1, 0, 0));
    }

    #[test]
    fn budget_needs_cover_every_action_the_branch_attempts() {
        let capture = FunnelBranch::EmailCapture {
            email: "jane@example.com".to_owned(),
        };
        assert_eq!(capture.budget_needs(), (1, 0, 0));
        assert_eq!(FunnelBranch::DirectMessage.budget_needs(), (1, 1, 0));
        assert_eq!(
            FunnelBranch::ConnectionInvite {
                invitation_outstanding: false
            }
            .budget_needs(),
            (1, 0, 1)
        );
    }

    #[test]
    fn lead_status_advances_match_the_branch() {
        assert_eq!(
            FunnelBranch::DirectMessage.lead_status(),
            revos_core::LeadStatus::DmSent
        );
        assert_eq!(
            FunnelBranch::ConnectionInvite {
                invitation_outstanding: false
            }
            .lead_status(),
            revos_core::LeadStatus::ConnectionPending
        );
    }

    #[test]
    fn templates_carry_the_personalisation_fields() {
        let reply = templates::inbox_ack("Jane", "The Outbound Playbook");
        assert!(reply.contains("Jane"));
        assert!(reply.contains("The Outbound Playbook"));

        let note = templates::invite_note("Jane", "The Outbound Playbook");
        assert!(note.len() < 300);
    }
}
