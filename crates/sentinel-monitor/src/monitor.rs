//! The login monitor.
//!
//! Per-user state lives in a sharded concurrent map: attempts for
//! different users evaluate in parallel, while the map's per-key entry
//! guard serializes same-user attempts so known-set updates and window
//! counts never race. Audit persistence and alert delivery happen after
//! the per-user guard is released.

use dashmap::DashMap;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

use sentinel_audit::{AuditAction, AuditChain, EntryDraft};
use sentinel_core::UserId;

use crate::alerts::{AlertBus, AlertReceiver, AlertSubscriber};
use crate::anomaly::Anomaly;
use crate::attempt::LoginAttempt;
use crate::config::MonitorConfig;
use crate::error::MonitorResult;
use crate::heuristics;
use crate::state::UserActivity;

/// Behavioral login monitor.
///
/// Feed it every login attempt via
/// [`record_login_attempt`](Self::record_login_attempt); it keeps a
/// per-user baseline, evaluates the six heuristics, records the attempt
/// on the audit chain, and fans detected anomalies out to alert
/// subscribers.
pub struct AuthMonitor {
    config: MonitorConfig,
    audit: Arc<AuditChain>,
    alerts: AlertBus,
    users: DashMap<UserId, UserActivity>,
}

impl AuthMonitor {
    /// Create a monitor with production default thresholds.
    #[must_use]
    pub fn new(audit: Arc<AuditChain>) -> Self {
        Self::with_config(MonitorConfig::default(), audit)
    }

    /// Create a monitor with explicit thresholds.
    #[must_use]
    pub fn with_config(config: MonitorConfig, audit: Arc<AuditChain>) -> Self {
        Self {
            config,
            audit,
            alerts: AlertBus::new(),
            users: DashMap::new(),
        }
    }

    /// Record a login attempt and evaluate every heuristic against it.
    ///
    /// In order: the heuristics read the user's pre-update baseline
    /// (known sets never contain the device/IP the current attempt
    /// introduces), the attempt joins history and - on success - the
    /// known sets, the attempt is recorded on the audit chain, and each
    /// detected anomaly is delivered to subscribers off this call's
    /// path.
    ///
    /// Returns the anomalies detected for this attempt; several kinds
    /// can fire at once.
    ///
    /// # Errors
    ///
    /// Returns [`crate::MonitorError::Audit`] if the audit chain could
    /// not persist the login event. History, known sets, and alert
    /// delivery are already applied by then - persistence failure does
    /// not erase detection for this attempt.
    pub fn record_login_attempt(&self, attempt: LoginAttempt) -> MonitorResult<Vec<Anomaly>> {
        let user_id = attempt.user_id.clone();

        let anomalies = {
            // Entry guard = the per-user critical section.
            let mut activity = self.users.entry(user_id.clone()).or_default();
            let anomalies = heuristics::evaluate(&self.config, &activity, &attempt);
            activity.record(&attempt, &self.config);
            anomalies
        };

        if !anomalies.is_empty() {
            debug!(
                user = %user_id,
                count = anomalies.len(),
                "login anomalies detected"
            );
        }

        let appended = self.audit.append(
            EntryDraft::new(AuditAction::Login)
                .user(user_id.clone())
                .success(attempt.success)
                .created_at(attempt.timestamp)
                .details(json!({
                    "ip_address": attempt.ip_address,
                    "device_info": attempt.device_info,
                    "platform": attempt.platform,
                    "anomalies": anomalies.iter().map(|a| a.kind.as_str()).collect::<Vec<_>>(),
                })),
        );

        if let Err(e) = &appended {
            warn!(user = %user_id, error = %e, "login event not persisted");
        }

        self.alerts.publish(&user_id, &anomalies);

        appended?;
        Ok(anomalies)
    }

    /// Login attempts for a user within the trailing `days` window,
    /// oldest-first.
    #[must_use]
    pub fn login_history(&self, user_id: &UserId, days: u32) -> Vec<LoginAttempt> {
        let cutoff = chrono::Utc::now() - chrono::Duration::days(i64::from(days));
        self.users.get(user_id).map_or_else(Vec::new, |activity| {
            activity
                .attempts
                .iter()
                .filter(|a| a.timestamp.0 >= cutoff)
                .cloned()
                .collect()
        })
    }

    /// Known device fingerprints for a user, sorted.
    ///
    /// Empty for a user with no recorded successful logins.
    #[must_use]
    pub fn known_devices(&self, user_id: &UserId) -> Vec<String> {
        self.users.get(user_id).map_or_else(Vec::new, |activity| {
            let mut devices: Vec<String> = activity.known_devices.iter().cloned().collect();
            devices.sort();
            devices
        })
    }

    /// Known IP addresses for a user, sorted.
    ///
    /// Empty for a user with no recorded successful logins.
    #[must_use]
    pub fn known_ips(&self, user_id: &UserId) -> Vec<String> {
        self.users.get(user_id).map_or_else(Vec::new, |activity| {
            let mut ips: Vec<String> = activity.known_ips.iter().cloned().collect();
            ips.sort();
            ips
        })
    }

    /// Wipe history and known sets for exactly this user.
    pub fn clear_history(&self, user_id: &UserId) {
        self.users.remove(user_id);
        debug!(user = %user_id, "login history cleared");
    }

    /// Number of users with tracked state.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Users with tracked state.
    #[must_use]
    pub fn tracked_users(&self) -> Vec<UserId> {
        self.users.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Register a closure invoked with `(user_id, anomaly)` for every
    /// future detection. A panicking subscriber cannot affect other
    /// subscribers or this monitor's callers.
    pub fn on_alert<F>(&self, callback: F)
    where
        F: Fn(&UserId, &Anomaly) + Send + Sync + 'static,
    {
        self.alerts.on_alert(callback);
    }

    /// Register a subscriber object.
    pub fn register_subscriber(&self, subscriber: Arc<dyn AlertSubscriber>) {
        self.alerts.register(subscriber);
    }

    /// Subscribe to the async alert stream.
    #[must_use]
    pub fn subscribe_alerts(&self) -> AlertReceiver {
        self.alerts.subscribe()
    }

    /// The monitor's configuration.
    #[must_use]
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }
}

impl std::fmt::Debug for AuthMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthMonitor")
            .field("tracked_users", &self.users.len())
            .finish_non_exhaustive()
    }
}
