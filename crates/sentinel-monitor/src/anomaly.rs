//! Anomaly types emitted by the heuristics.

use sentinel_core::Timestamp;
use serde::{Deserialize, Serialize};

/// Severity of an anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    /// Worth surfacing, not actionable on its own.
    Info,
    /// Deserves attention.
    Warning,
    /// Likely an active attack.
    Critical,
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// The kind of deviation a heuristic detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// Repeated failed attempts inside a trailing window.
    BruteForce,
    /// Successful login from an unknown device fingerprint.
    NewDevice,
    /// Successful login from an unknown IP address.
    NewIp,
    /// Login at an hour rare for this user.
    UnusualTime,
    /// Successful logins faster than sessions are plausibly cycled.
    RapidSessionSwitching,
    /// Consecutive successes from different addresses too close in time.
    ImpossibleTravel,
}

impl AnomalyKind {
    /// Stable snake_case name, identical to the serde encoding.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BruteForce => "brute_force",
            Self::NewDevice => "new_device",
            Self::NewIp => "new_ip",
            Self::UnusualTime => "unusual_time",
            Self::RapidSessionSwitching => "rapid_session_switching",
            Self::ImpossibleTravel => "impossible_travel",
        }
    }
}

impl std::fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed, leveled signal emitted when a login attempt deviates from
/// the user's behavioral baseline.
///
/// Anomalies are ephemeral: the triggering login event is persisted
/// through the audit chain, but the anomaly itself only lives as long
/// as its delivery to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    /// What kind of deviation was detected.
    pub kind: AnomalyKind,
    /// How severe it is.
    pub level: AlertLevel,
    /// Human-readable summary.
    pub message: String,
    /// Heuristic-specific key/value details.
    pub details: serde_json::Value,
    /// When the deviation was detected (the triggering attempt's time).
    pub detected_at: Timestamp,
}

impl Anomaly {
    /// Create an anomaly.
    #[must_use]
    pub fn new(
        kind: AnomalyKind,
        level: AlertLevel,
        message: impl Into<String>,
        details: serde_json::Value,
        detected_at: Timestamp,
    ) -> Self {
        Self {
            kind,
            level,
            message: message.into(),
            details,
            detected_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(AlertLevel::Info < AlertLevel::Warning);
        assert!(AlertLevel::Warning < AlertLevel::Critical);
    }

    #[test]
    fn test_kind_serde_is_snake_case() {
        let json = serde_json::to_string(&AnomalyKind::ImpossibleTravel).unwrap();
        assert_eq!(json, "\"impossible_travel\"");
        assert_eq!(AnomalyKind::RapidSessionSwitching.as_str(), "rapid_session_switching");
    }
}
