//! Prelude module - commonly used types for convenient import.
//!
//! Use `use sentinel_core::prelude::*;` to import all essential types.

pub use crate::types::{AuditEntryId, SessionId, Timestamp, UserId};
