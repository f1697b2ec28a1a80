//! Login attempt input records.

use sentinel_core::{Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// A single login attempt, as reported by the session layer.
///
/// The `timestamp` is the attempt's own declared event time; every
/// trailing-window heuristic is computed against it, which keeps
/// evaluation deterministic under synthetic clocks. Whether to trust
/// client-declared timestamps or stamp server receipt time is the
/// ingest layer's decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginAttempt {
    /// The user attempting to log in.
    pub user_id: UserId,
    /// Whether authentication succeeded.
    pub success: bool,
    /// Source IP address.
    pub ip_address: String,
    /// Device fingerprint (user agent, client build, etc.).
    pub device_info: String,
    /// When the attempt happened.
    pub timestamp: Timestamp,
    /// Platform the attempt came from (e.g. `"web"`, `"desktop"`).
    pub platform: Option<String>,
}

impl LoginAttempt {
    /// Create an attempt record.
    pub fn new(
        user_id: impl Into<UserId>,
        success: bool,
        ip_address: impl Into<String>,
        device_info: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            success,
            ip_address: ip_address.into(),
            device_info: device_info.into(),
            timestamp,
            platform: None,
        }
    }

    /// Attach the originating platform.
    #[must_use]
    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }
}
