//! Prelude module - commonly used types for convenient import.
//!
//! Use `use sentinel_monitor::prelude::*;` to import all essential types.

// Errors
pub use crate::{MonitorError, MonitorResult};

// Monitor and input
pub use crate::{AuthMonitor, LoginAttempt, MonitorConfig};

// Anomalies
pub use crate::{AlertLevel, Anomaly, AnomalyKind};

// Alert delivery
pub use crate::{AlertBus, AlertEvent, AlertReceiver, AlertSubscriber};
