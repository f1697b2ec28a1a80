//! Per-user behavioral state.
//!
//! Each user's state is exclusively owned: it is only ever touched
//! while the monitor holds that user's map entry, so nothing here needs
//! its own locking.

use std::collections::HashSet;

use crate::attempt::LoginAttempt;
use crate::config::MonitorConfig;

/// Recent attempts plus the known-device/IP baseline for one user.
///
/// Known sets are populated only from successful attempts, and only
/// *after* the heuristics have read the pre-update state: a device or
/// IP is never "known" to the very attempt that introduces it.
#[derive(Debug, Default)]
pub(crate) struct UserActivity {
    /// Time-ordered recent attempts, successes and failures both.
    pub(crate) attempts: Vec<LoginAttempt>,
    /// Device fingerprints seen on successful logins.
    pub(crate) known_devices: HashSet<String>,
    /// IP addresses seen on successful logins.
    pub(crate) known_ips: HashSet<String>,
}

impl UserActivity {
    /// Append an attempt to history and, on success, absorb its device
    /// and IP into the known sets. Prunes history beyond the configured
    /// retention and size bounds.
    pub(crate) fn record(&mut self, attempt: &LoginAttempt, config: &MonitorConfig) {
        self.attempts.push(attempt.clone());

        if attempt.success {
            if !attempt.device_info.is_empty() {
                self.known_devices.insert(attempt.device_info.clone());
            }
            if !attempt.ip_address.is_empty() {
                self.known_ips.insert(attempt.ip_address.clone());
            }
        }

        self.prune(attempt, config);
    }

    /// Drop attempts past the retention window (relative to the newest
    /// attempt's own timestamp) or beyond the per-user size bound,
    /// oldest first.
    fn prune(&mut self, newest: &LoginAttempt, config: &MonitorConfig) {
        let cutoff = newest.timestamp.0 - config.retention_window();
        self.attempts.retain(|a| a.timestamp.0 >= cutoff);

        if self.attempts.len() > config.max_history_per_user {
            let excess = self.attempts.len().saturating_sub(config.max_history_per_user);
            self.attempts.drain(..excess);
        }
    }

    /// The most recent successful attempt in history.
    pub(crate) fn last_success(&self) -> Option<&LoginAttempt> {
        self.attempts.iter().rev().find(|a| a.success)
    }

    /// Iterate successful attempts in history.
    pub(crate) fn successes(&self) -> impl Iterator<Item = &LoginAttempt> {
        self.attempts.iter().filter(|a| a.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use sentinel_core::Timestamp;

    fn at(minute_offset: i64) -> Timestamp {
        let base = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        Timestamp(base + Duration::minutes(minute_offset))
    }

    fn attempt(success: bool, minute_offset: i64) -> LoginAttempt {
        LoginAttempt::new("alice", success, "203.0.113.7", "firefox", at(minute_offset))
    }

    #[test]
    fn test_success_populates_known_sets() {
        let config = MonitorConfig::default();
        let mut state = UserActivity::default();

        state.record(&attempt(true, 0), &config);
        assert!(state.known_devices.contains("firefox"));
        assert!(state.known_ips.contains("203.0.113.7"));
    }

    #[test]
    fn test_failure_does_not_populate_known_sets() {
        let config = MonitorConfig::default();
        let mut state = UserActivity::default();

        state.record(&attempt(false, 0), &config);
        assert!(state.known_devices.is_empty());
        assert!(state.known_ips.is_empty());
        assert_eq!(state.attempts.len(), 1);
    }

    #[test]
    fn test_empty_fingerprints_are_not_absorbed() {
        let config = MonitorConfig::default();
        let mut state = UserActivity::default();

        let blank = LoginAttempt::new("alice", true, "", "", at(0));
        state.record(&blank, &config);
        assert!(state.known_devices.is_empty());
        assert!(state.known_ips.is_empty());
    }

    #[test]
    fn test_prune_by_size_drops_oldest() {
        let config = MonitorConfig {
            max_history_per_user: 3,
            ..MonitorConfig::default()
        };
        let mut state = UserActivity::default();

        for i in 0..5 {
            state.record(&attempt(true, i), &config);
        }
        assert_eq!(state.attempts.len(), 3);
        assert_eq!(state.attempts[0].timestamp, at(2));
    }

    #[test]
    fn test_prune_by_retention() {
        let config = MonitorConfig {
            history_retention_days: 1,
            ..MonitorConfig::default()
        };
        let mut state = UserActivity::default();

        state.record(&attempt(true, 0), &config);
        // Two days later: the first attempt ages out.
        state.record(&attempt(true, 2 * 24 * 60), &config);
        assert_eq!(state.attempts.len(), 1);
    }

    #[test]
    fn test_last_success_skips_failures() {
        let config = MonitorConfig::default();
        let mut state = UserActivity::default();

        state.record(&attempt(true, 0), &config);
        state.record(&attempt(false, 1), &config);
        state.record(&attempt(false, 2), &config);

        assert_eq!(state.last_success().unwrap().timestamp, at(0));
        assert_eq!(state.successes().count(), 1);
    }
}
