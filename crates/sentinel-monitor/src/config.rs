//! Monitor configuration.
//!
//! Thresholds are configuration, not constants; the defaults here are
//! the production values the detection tests assume. Every field has a
//! serde default, so a bare `[monitor]` section in a config file
//! produces a working configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Thresholds and windows for the login heuristics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Failed attempts within [`Self::brute_force_window_secs`] that
    /// trigger `brute_force`.
    pub brute_force_threshold: u32,
    /// Trailing window for `brute_force`, in seconds.
    pub brute_force_window_secs: u32,
    /// Successful logins within [`Self::rapid_switch_window_secs`] that
    /// trigger `rapid_session_switching`.
    pub rapid_switch_threshold: u32,
    /// Trailing window for `rapid_session_switching`, in seconds.
    pub rapid_switch_window_secs: u32,
    /// How close together two successes from different addresses must
    /// be to trigger `impossible_travel`, in seconds.
    pub travel_window_secs: u32,
    /// Prior successful logins required before `unusual_time` has a
    /// baseline to judge against.
    pub unusual_hour_min_sample: u32,
    /// Hour-of-day frequency ratio below which an hour counts as rare.
    pub unusual_hour_rarity: f64,
    /// Upper bound on retained attempts per user.
    pub max_history_per_user: usize,
    /// Attempts older than this many days are pruned from history.
    pub history_retention_days: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            brute_force_threshold: 5,
            brute_force_window_secs: 600,
            rapid_switch_threshold: 5,
            rapid_switch_window_secs: 300,
            travel_window_secs: 1800,
            unusual_hour_min_sample: 20,
            unusual_hour_rarity: 0.05,
            max_history_per_user: 500,
            history_retention_days: 30,
        }
    }
}

impl MonitorConfig {
    /// Trailing window for `brute_force`.
    #[must_use]
    pub fn brute_force_window(&self) -> Duration {
        Duration::seconds(i64::from(self.brute_force_window_secs))
    }

    /// Trailing window for `rapid_session_switching`.
    #[must_use]
    pub fn rapid_switch_window(&self) -> Duration {
        Duration::seconds(i64::from(self.rapid_switch_window_secs))
    }

    /// Trailing window for `impossible_travel`.
    #[must_use]
    pub fn travel_window(&self) -> Duration {
        Duration::seconds(i64::from(self.travel_window_secs))
    }

    /// History retention window.
    #[must_use]
    pub fn retention_window(&self) -> Duration {
        Duration::days(i64::from(self.history_retention_days))
    }
}
