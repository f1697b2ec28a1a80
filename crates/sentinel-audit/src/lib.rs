//! Sentinel Audit - Hash-chained, tamper-evident audit logging.
//!
//! This crate provides:
//! - An append-only log of security-relevant actions
//! - Chain-linked entries (each embeds the digest of the previous)
//! - Chain integrity verification
//! - A filtered, paginated query surface
//!
//! # Security Model
//!
//! Every audit entry is:
//! - Assigned a strictly increasing sequence number at append time
//! - Linked to the previous entry via content digest
//! - Timestamped
//!
//! The digest over an entry is a pure function of its content plus the
//! previous entry's digest, so any retroactive edit to a committed entry
//! breaks the chain and is detectable. A single linear chain is enough
//! here: verification only needs tamper *detection*, not sub-range
//! proofs, and one mismatch invalidates everything after it.
//!
//! # Example
//!
//! ```
//! use sentinel_audit::{AuditAction, AuditChain, EntryDraft};
//!
//! // Create an in-memory audit chain
//! let chain = AuditChain::in_memory();
//!
//! // Record an action
//! let entry_id = chain.append(
//!     EntryDraft::new(AuditAction::Login)
//!         .user("alice")
//!         .success(true),
//! ).unwrap();
//!
//! // Verify chain integrity
//! let report = chain.verify_chain(None).unwrap();
//! assert!(report.valid);
//! assert_eq!(report.total_entries, 1);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod chain;
mod digest;
mod entry;
mod error;
mod storage;

pub use chain::{AuditChain, ChainIssue, ChainVerification, EntryPage};
pub use digest::EntryDigest;
pub use entry::{AuditAction, AuditEntry, EntryDraft};
pub use error::{AuditError, AuditResult};
pub use storage::{AuditStore, EntryFilter, MemoryAuditStore};

// Re-export the entry id from core for convenience
pub use sentinel_core::AuditEntryId;
