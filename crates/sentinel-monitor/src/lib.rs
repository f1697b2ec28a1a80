//! Sentinel Monitor - Behavioral login anomaly detection.
//!
//! This crate watches the stream of login attempts, maintains a
//! behavioral baseline per user, and flags deviations in real time:
//!
//! - `brute_force` - repeated failures inside a trailing window
//! - `new_device` / `new_ip` - a successful login from a fingerprint or
//!   address the user has never used before
//! - `unusual_time` - a login at an hour rare for this user
//! - `rapid_session_switching` - successful logins faster than a person
//!   plausibly cycles sessions
//! - `impossible_travel` - two successes from different addresses closer
//!   together than travel allows
//!
//! Every attempt is durably recorded through the audit chain, and each
//! detected anomaly is delivered to registered alert subscribers off the
//! detection path.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use sentinel_audit::AuditChain;
//! use sentinel_monitor::{AuthMonitor, LoginAttempt};
//! use sentinel_core::Timestamp;
//!
//! let audit = Arc::new(AuditChain::in_memory());
//! let monitor = AuthMonitor::new(audit);
//!
//! let anomalies = monitor.record_login_attempt(LoginAttempt::new(
//!     "alice",
//!     true,
//!     "203.0.113.7",
//!     "Firefox 128 / Linux",
//!     Timestamp::now(),
//! )).unwrap();
//!
//! // First recorded login: no baseline yet, nothing fires.
//! assert!(anomalies.is_empty());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod alerts;
mod anomaly;
mod attempt;
mod config;
mod error;
mod heuristics;
mod monitor;
mod state;

pub use alerts::{AlertBus, AlertEvent, AlertReceiver, AlertSubscriber};
pub use anomaly::{AlertLevel, Anomaly, AnomalyKind};
pub use attempt::LoginAttempt;
pub use config::MonitorConfig;
pub use error::{MonitorError, MonitorResult};
pub use monitor::AuthMonitor;
