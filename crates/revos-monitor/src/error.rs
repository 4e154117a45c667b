use revos_db::DbError;
use revos_social::SocialError;
use thiserror::Error;

/// Job-level errors routed to the failure manager.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Social(#[from] SocialError),
}

impl MonitorError {
    /// True when the underlying cause is the upstream-not-found class,
    /// which accumulates toward permanent job disablement.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, MonitorError::Social(e) if e.is_not_found())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_classification_follows_the_social_error() {
        let err = MonitorError::from(SocialError::NotFound {
            what: "post".to_owned(),
        });
        assert!(err.is_not_found());

        let err = MonitorError::from(SocialError::Transport("timeout".to_owned()));
        assert!(!err.is_not_found());

        let err = MonitorError::from(DbError::NotFound);
        assert!(!err.is_not_found());
    }
}
