use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comment on a watched post, as returned by the platform client.
///
/// Comments are read-only upstream data; only the id and the derived
/// outcome are ever persisted locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Platform-assigned comment id.
    pub id: String,
    /// Platform-assigned author id.
    pub author_id: String,
    /// Author display name, e.g. "Jane Smith".
    pub author_name: String,
    pub author_profile_url: Option<String>,
    pub text: String,
    pub posted_at: Option<DateTime<Utc>>,
}

impl Comment {
    /// First whitespace-separated part of the display name, used to
    /// personalise funnel messages. Falls back to the full name.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.author_name
            .split_whitespace()
            .next()
            .unwrap_or(self.author_name.as_str())
    }
}

/// Relationship between the posting account and a comment author.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub is_connected: bool,
    /// An invitation from the account to this author is already
    /// outstanding. Sending another would duplicate the invite.
    pub has_pending_invitation: bool,
}

/// Extractor confidence. Only medium and high are actionable; low
/// confidence results are ignored by the funnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailConfidence {
    Low,
    Medium,
    High,
}

impl EmailConfidence {
    #[must_use]
    pub fn is_actionable(self) -> bool {
        matches!(self, EmailConfidence::Medium | EmailConfidence::High)
    }
}

/// An email address pulled out of comment text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedEmail {
    pub email: String,
    pub confidence: EmailConfidence,
}

/// Result of sending a connection request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Invitation {
    /// Platform invitation id; `None` when the platform reports an
    /// invitation already existed.
    pub invitation_id: Option<String>,
}

/// Alert severity, mirrored into the sink's own levels by each backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_name_takes_leading_token() {
        let comment = Comment {
            id: "c1".to_owned(),
            author_id: "a1".to_owned(),
            author_name: "Jane Q Smith".to_owned(),
            author_profile_url: None,
            text: String::new(),
            posted_at: None,
        };
        assert_eq!(comment.first_name(), "Jane");
    }

    #[test]
    fn first_name_falls_back_to_full_name_when_blank() {
        let comment = Comment {
            id: "c1".to_owned(),
            author_id: "a1".to_owned(),
            author_name: "  ".to_owned(),
            author_profile_url: None,
            text: String::new(),
            posted_at: None,
        };
        assert_eq!(comment.first_name(), "  ");
    }

    #[test]
    fn only_medium_and_high_confidence_are_actionable() {
        assert!(!EmailConfidence::Low.is_actionable());
        assert!(EmailConfidence::Medium.is_actionable());
        assert!(EmailConfidence::High.is_actionable());
    }
}
