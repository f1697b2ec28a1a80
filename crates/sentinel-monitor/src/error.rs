//! Monitor-related error types.

use thiserror::Error;

/// Errors that can occur while recording login attempts.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The audit chain failed to persist the login event.
    ///
    /// In-memory behavioral state (history, known sets) and alert
    /// delivery are already applied when this is returned; only the
    /// durable record is missing.
    #[error("audit persistence failed: {0}")]
    Audit(#[from] sentinel_audit::AuditError),
}

/// Result type for monitor operations.
pub type MonitorResult<T> = Result<T, MonitorError>;
