//! Sentinel Core - Foundation types for the Sentinel security-telemetry core.
//!
//! This crate provides the identifiers and timestamp type shared by the
//! audit chain, the login monitor, and the request-path guards:
//! - `UserId` / `SessionId` - opaque identifiers handed in by the session layer
//! - `Timestamp` - UTC timestamp used for every window computation
//! - `AuditEntryId` - unique identifier for audit log entries

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod types;

pub use types::{AuditEntryId, SessionId, Timestamp, UserId};
