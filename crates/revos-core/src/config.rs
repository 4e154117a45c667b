//! Environment-driven configuration for the comment monitor.

use std::env;

const DEFAULT_POLL_INTERVAL_MINUTES: i64 = 5;
const DEFAULT_STALE_AFTER_MINUTES: i64 = 10;
const DEFAULT_NOT_FOUND_FAIL_THRESHOLD: i32 = 3;
const DEFAULT_MAX_REPLIES_PER_CYCLE: u32 = 25;
const DEFAULT_MAX_DMS_PER_CYCLE: u32 = 20;
const DEFAULT_MAX_CONNECTION_REQUESTS_PER_CYCLE: u32 = 10;

/// Tunables for the poll cycle. All values carry production defaults and
/// can be overridden per-deployment through `REVOS_*` environment
/// variables.
#[derive(Debug, Clone, Copy)]
pub struct MonitorConfig {
    /// Delay before a completed job is due again.
    pub poll_interval_minutes: i64,
    /// Age after which a `running` job is considered abandoned by a
    /// crashed worker and reclaimed.
    pub stale_after_minutes: i64,
    /// Consecutive upstream-not-found errors before a job is permanently
    /// disabled.
    pub not_found_fail_threshold: i32,
    /// Public-reply ceiling per job cycle.
    pub max_replies_per_cycle: u32,
    /// Direct-message ceiling per job cycle.
    pub max_dms_per_cycle: u32,
    /// Connection-request ceiling per job cycle.
    pub max_connection_requests_per_cycle: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_minutes: DEFAULT_POLL_INTERVAL_MINUTES,
            stale_after_minutes: DEFAULT_STALE_AFTER_MINUTES,
            not_found_fail_threshold: DEFAULT_NOT_FOUND_FAIL_THRESHOLD,
            max_replies_per_cycle: DEFAULT_MAX_REPLIES_PER_CYCLE,
            max_dms_per_cycle: DEFAULT_MAX_DMS_PER_CYCLE,
            max_connection_requests_per_cycle: DEFAULT_MAX_CONNECTION_REQUESTS_PER_CYCLE,
        }
    }
}

impl MonitorConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            poll_interval_minutes: read_i64(
                "REVOS_POLL_INTERVAL_MINUTES",
                DEFAULT_POLL_INTERVAL_MINUTES,
            ),
            stale_after_minutes: read_i64("REVOS_STALE_AFTER_MINUTES", DEFAULT_STALE_AFTER_MINUTES),
            not_found_fail_threshold: read_i32(
                "REVOS_NOT_FOUND_FAIL_THRESHOLD",
                DEFAULT_NOT_FOUND_FAIL_THRESHOLD,
            ),
            max_replies_per_cycle: read_u32(
                "REVOS_MAX_REPLIES_PER_CYCLE",
                DEFAULT_MAX_REPLIES_PER_CYCLE,
            ),
            max_dms_per_cycle: read_u32("REVOS_MAX_DMS_PER_CYCLE", DEFAULT_MAX_DMS_PER_CYCLE),
            max_connection_requests_per_cycle: read_u32(
                "REVOS_MAX_CONNECTION_REQUESTS_PER_CYCLE",
                DEFAULT_MAX_CONNECTION_REQUESTS_PER_CYCLE,
            ),
        }
    }
}

fn read_i64(var: &str, default: i64) -> i64 {
    env::var(var)
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(default)
}

fn read_i32(var: &str, default: i32) -> i32 {
    env::var(var)
        .ok()
        .and_then(|v| v.parse::<i32>().ok())
        .unwrap_or(default)
}

fn read_u32(var: &str, default: u32) -> u32 {
    env::var(var)
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monitor_config_has_sane_defaults() {
        let config = MonitorConfig::default();

        assert_eq!(config.poll_interval_minutes, 5);
        assert_eq!(config.stale_after_minutes, 10);
        assert_eq!(config.not_found_fail_threshold, 3);
        assert!(config.max_replies_per_cycle > 0);
        assert!(config.max_dms_per_cycle > 0);
        assert!(config.max_connection_requests_per_cycle > 0);
    }
}
