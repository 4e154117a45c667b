use thiserror::Error;

/// Errors surfaced by platform client implementations.
///
/// The monitor's failure handling only distinguishes two classes: the
/// not-found class ([`SocialError::NotFound`]), which accumulates toward
/// permanent job disablement, and everything else, which is retried on the
/// next natural poll cycle.
#[derive(Debug, Error)]
pub enum SocialError {
    /// The watched post, account, or author no longer exists upstream.
    #[error("not found: {what}")]
    NotFound { what: String },

    /// The platform asked us to back off (HTTP 429 or equivalent).
    #[error("rate limited by platform (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    /// Credentials rejected or session expired.
    #[error("platform auth failure: {0}")]
    Auth(String),

    /// Network-level failure: connection reset, timeout, TLS.
    #[error("transport error: {0}")]
    Transport(String),

    /// The platform returned an application-level error payload.
    #[error("platform API error: {0}")]
    Api(String),
}

impl SocialError {
    /// True for the error class that counts toward auto-disabling a job.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, SocialError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_not_found_is_classified_as_not_found() {
        assert!(SocialError::NotFound {
            what: "post urn:123".to_owned()
        }
        .is_not_found());
        assert!(!SocialError::RateLimited {
            retry_after_secs: 30
        }
        .is_not_found());
        assert!(!SocialError::Transport("connection reset".to_owned()).is_not_found());
        assert!(!SocialError::Api("internal error".to_owned()).is_not_found());
    }
}
