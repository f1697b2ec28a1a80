//! Sentinel RBAC - Static role-permission hierarchy.
//!
//! Answers two questions from a fixed table built once at startup:
//! "does role R have permission P" and "is role A at least as
//! privileged as role B". Roles are totally ordered
//! (`viewer < member < admin < owner`) and permissions are cumulative:
//! the table for each tier is built by extending the tier below, so
//! every grant a lower role holds is structurally guaranteed to every
//! higher role. Absence is the safe default - unknown roles or
//! permissions answer `false`, never an error.
//!
//! # Example
//!
//! ```
//! use sentinel_rbac::{Role, has_permission, is_at_least};
//!
//! assert!(has_permission(Role::Member, "chat:write"));
//! assert!(!has_permission(Role::Viewer, "org:invite"));
//! assert!(is_at_least(Role::Admin, Role::Member));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod role;
mod table;

pub use role::{Role, UnknownRole};
pub use table::{has_permission, has_permission_str, is_at_least, permissions};
