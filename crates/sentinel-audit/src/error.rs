//! Audit-related error types.

use thiserror::Error;

/// Errors that can occur with audit logging.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The storage collaborator failed to persist or read an entry.
    ///
    /// An append that fails this way does not consume a sequence
    /// number; retrying produces the same chain linkage.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Entry not found at the given sequence number.
    #[error("audit entry not found at sequence {sequence}")]
    EntryNotFound {
        /// The sequence number that was not found.
        sequence: u64,
    },
}

/// Result type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;
