//! Prelude module - commonly used types for convenient import.
//!
//! Use `use sentinel_rbac::prelude::*;` to import all essential items.

pub use crate::{Role, UnknownRole, has_permission, has_permission_str, is_at_least, permissions};
