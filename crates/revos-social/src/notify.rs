use async_trait::async_trait;

use crate::client::Alerter;
use crate::types::Severity;

/// Default alert backend: structured log lines. Deployments that route
/// alerts to a chat webhook or pager provide their own [`Alerter`].
pub struct LogAlerter;

#[async_trait]
impl Alerter for LogAlerter {
    async fn alert(&self, message: &str, severity: Severity, context: serde_json::Value) {
        match severity {
            Severity::Info => tracing::info!(%context, "alert: {message}"),
            Severity::Warning => tracing::warn!(%context, "alert: {message}"),
            Severity::Error => tracing::error!(%context, "alert: {message}"),
        }
    }
}

/// No-op alert backend for tests.
pub struct NoopAlerter;

#[async_trait]
impl Alerter for NoopAlerter {
    async fn alert(&self, _message: &str, _severity: Severity, _context: serde_json::Value) {}
}
