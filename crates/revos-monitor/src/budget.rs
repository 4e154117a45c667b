//! Per-cycle rate budget.
//!
//! Three independent ceilings, one per outbound action type, shared by
//! all comments processed within one job cycle. The orchestrator reserves
//! everything a funnel branch needs before the branch's first side
//! effect; once any required ceiling is exhausted the cycle stops and the
//! remaining comments wait for the next poll.

use revos_core::MonitorConfig;

/// Decrementing counters for one job cycle. Never persisted; a fresh
/// budget is built per invocation.
#[derive(Debug, Clone, Copy)]
pub struct CycleBudget {
    replies: u32,
    dms: u32,
    connection_requests: u32,
}

impl CycleBudget {
    #[must_use]
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            replies: config.max_replies_per_cycle,
            dms: config.max_dms_per_cycle,
            connection_requests: config.max_connection_requests_per_cycle,
        }
    }

    /// All-or-nothing reservation of the actions one branch will attempt.
    /// Returns false (and deducts nothing) when any ceiling is short.
    pub fn reserve(&mut self, replies: u32, dms: u32, connection_requests: u32) -> bool {
        if self.replies < replies || self.dms < dms || self.connection_requests < connection_requests
        {
            return false;
        }
        self.replies -= replies;
        self.dms -= dms;
        self.connection_requests -= connection_requests;
        true
    }

    #[must_use]
    pub fn replies_remaining(&self) -> u32 {
        self.replies
    }

    #[must_use]
    pub fn dms_remaining(&self) -> u32 {
        self.dms
    }

    #[must_use]
    pub fn connection_requests_remaining(&self) -> u32 {
        self.connection_requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget(replies: u32, dms: u32, invites: u32) -> CycleBudget {
        CycleBudget::new(&MonitorConfig {
            max_replies_per_cycle: replies,
            max_dms_per_cycle: dms,
            max_connection_requests_per_cycle: invites,
            ..MonitorConfig::default()
        })
    }

    #[test]
    fn reserve_deducts_each_ceiling_independently() {
        let mut b = budget(2, 1, 1);
        assert!(b.reserve(1, 1, 0));
        assert_eq!(b.replies_remaining(), 1);
        assert_eq!(b.dms_remaining(), 0);
        assert_eq!(b.connection_requests_remaining(), 1);
    }

    #[test]
    fn reserve_is_all_or_nothing() {
        let mut b = budget(1, 0, 1);
        // DM ceiling is short; nothing may be deducted.
        assert!(!b.reserve(1, 1, 0));
        assert_eq!(b.replies_remaining(), 1);
        assert_eq!(b.connection_requests_remaining(), 1);
    }

    #[test]
    fn exhausted_ceiling_blocks_further_reservations() {
        let mut b = budget(2, 1, 0);
        assert!(b.reserve(1, 1, 0));
        assert!(!b.reserve(1, 1, 0));
        // A branch that needs no DM still fits.
        assert!(b.reserve(1, 0, 0));
    }
}
