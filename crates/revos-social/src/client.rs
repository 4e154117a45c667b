use async_trait::async_trait;

use crate::error::SocialError;
use crate::types::{Comment, ConnectionStatus, ExtractedEmail, Invitation, Severity};

/// Platform operations the monitor consumes.
///
/// Implementations wrap whichever provider the deployment uses; the
/// monitor never sees provider specifics, only this contract and the
/// [`SocialError`] taxonomy.
#[async_trait]
pub trait SocialClient: Send + Sync {
    /// Fetch all comments currently visible on a post. An empty result is
    /// not an error; only transport/auth failures should error.
    async fn fetch_comments(
        &self,
        account_id: &str,
        external_post_id: &str,
    ) -> Result<Vec<Comment>, SocialError>;

    /// Relationship between the account and a comment author.
    async fn check_connection_status(
        &self,
        account_id: &str,
        author_id: &str,
    ) -> Result<ConnectionStatus, SocialError>;

    async fn send_direct_message(
        &self,
        account_id: &str,
        author_id: &str,
        text: &str,
    ) -> Result<(), SocialError>;

    async fn reply_to_comment(
        &self,
        account_id: &str,
        post_id: &str,
        text: &str,
        parent_comment_id: &str,
    ) -> Result<(), SocialError>;

    async fn send_connection_request(
        &self,
        account_id: &str,
        author_id: &str,
        text: &str,
    ) -> Result<Invitation, SocialError>;
}

/// Pulls an email address (with confidence) out of free text. The
/// heuristics live with the embedding application; the monitor only acts
/// on medium/high confidence results.
pub trait EmailExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Option<ExtractedEmail>;
}

/// Fire-and-forget operator alerting. Implementations must swallow their
/// own delivery failures; the orchestration path never depends on an
/// alert having landed.
#[async_trait]
pub trait Alerter: Send + Sync {
    async fn alert(&self, message: &str, severity: Severity, context: serde_json::Value);
}
