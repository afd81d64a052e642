//! Permission questions against an already-resolved role.
//!
//! All functions are total and side-effect free.

use crate::registry::permissions_of;
use crate::{Permission, PermissionSet, Role};

pub fn has_permission(role: Role, permission: Permission) -> bool {
    permissions_of(role).contains(permission)
}

/// `false` for an empty requirement: nothing was asked, so nothing matched.
pub fn has_any_permission(role: Role, permissions: impl Into<PermissionSet>) -> bool {
    permissions_of(role).intersects(permissions.into())
}

/// `true` for an empty requirement.
pub fn has_all_permissions(role: Role, permissions: impl Into<PermissionSet>) -> bool {
    permissions.into().is_subset(permissions_of(role))
}

/// Whether `acting` ranks at least as high as `target` in the hierarchy.
pub fn can_manage(acting: Role, target: Role) -> bool {
    acting.weight() >= target.weight()
}

pub fn is_one_of(role: Role, allowed: &[Role]) -> bool {
    allowed.contains(&role)
}
