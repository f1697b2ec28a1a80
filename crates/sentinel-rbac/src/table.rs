//! The role-permission table and its queries.
//!
//! Built once, process-wide, never mutated at runtime. Each tier's set
//! is constructed by extending the tier below it, so the subset chain
//! `viewer ⊂ member ⊂ admin ⊂ owner` holds by construction rather than
//! by convention.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use crate::role::Role;

/// Grants introduced at the viewer tier.
const VIEWER_GRANTS: &[&str] = &["chat:read", "memory:read", "file:read", "audit:read"];

/// Grants introduced at the member tier.
const MEMBER_GRANTS: &[&str] = &[
    "chat:write",
    "tool:use",
    "memory:write",
    "file:write",
    "agent:spawn",
    "web:browse",
];

/// Grants introduced at the admin tier.
const ADMIN_GRANTS: &[&str] = &[
    "org:invite",
    "settings:manage",
    "api_key:manage",
    "audit:export",
    "mode:change",
    "session:manage",
];

/// Grants introduced at the owner tier. No other role ever holds these.
const OWNER_GRANTS: &[&str] = &["org:manage", "org:delete", "billing:manage"];

static ROLE_PERMISSIONS: LazyLock<HashMap<Role, BTreeSet<&'static str>>> = LazyLock::new(|| {
    let viewer: BTreeSet<&'static str> = VIEWER_GRANTS.iter().copied().collect();

    let mut member = viewer.clone();
    member.extend(MEMBER_GRANTS.iter().copied());

    let mut admin = member.clone();
    admin.extend(ADMIN_GRANTS.iter().copied());

    let mut owner = admin.clone();
    owner.extend(OWNER_GRANTS.iter().copied());

    HashMap::from([
        (Role::Viewer, viewer),
        (Role::Member, member),
        (Role::Admin, admin),
        (Role::Owner, owner),
    ])
});

/// The full permission set for a role, sorted.
#[must_use]
pub fn permissions(role: Role) -> &'static BTreeSet<&'static str> {
    // Every role is present; the closed enum makes the lookup total.
    ROLE_PERMISSIONS
        .get(&role)
        .unwrap_or_else(|| unreachable!("role table covers every role"))
}

/// Whether `role` holds `permission`.
///
/// Unknown permission strings answer `false`.
#[must_use]
pub fn has_permission(role: Role, permission: &str) -> bool {
    permissions(role).contains(permission)
}

/// Whether the role named `role` holds `permission`.
///
/// Unknown role names and unknown permissions both answer `false` -
/// absence of a grant is the safe default.
#[must_use]
pub fn has_permission_str(role: &str, permission: &str) -> bool {
    Role::parse(role).is_some_and(|role| has_permission(role, permission))
}

/// Whether `role` is at least as privileged as `other`.
#[must_use]
pub fn is_at_least(role: Role, other: Role) -> bool {
    role >= other
}
