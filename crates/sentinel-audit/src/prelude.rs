//! Prelude module - commonly used types for convenient import.
//!
//! Use `use sentinel_audit::prelude::*;` to import all essential types.

// Errors
pub use crate::{AuditError, AuditResult};

// Entry types
pub use crate::{AuditAction, AuditEntry, EntryDraft};

// Chain and verification
pub use crate::{AuditChain, ChainIssue, ChainVerification, EntryPage};

// Storage
pub use crate::{AuditStore, EntryFilter, MemoryAuditStore};

// Digests
pub use crate::EntryDigest;

// Re-export from core
pub use crate::AuditEntryId;
