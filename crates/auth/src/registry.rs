//! Role hierarchy and the static role → permission table.
//!
//! The table is an exhaustive `match` over [`Role`], so adding a role or a
//! permission fails to compile until every entry accounts for it. There is no
//! runtime mutation API.

use serde::Serialize;

use crate::permissions::{Permission, PermissionCategory, PermissionSet};
use crate::roles::Role;

use Permission::*;

const FULL_CONTROL: PermissionSet = PermissionSet::all();

const MANAGER: PermissionSet = FULL_CONTROL.without(ManageUsers);

const EDITOR: PermissionSet = PermissionSet::of(&[
    CreateTasks,
    EditTasks,
    ViewTasks,
    CreatePr,
    EditPr,
    ViewPr,
    ViewAnalytics,
    ViewTalents,
    ViewTeam,
]);

const APPROVER: PermissionSet = PermissionSet::of(&[
    ApproveTasks,
    ViewTasks,
    ViewPr,
    ViewAnalytics,
    ViewTalents,
    ViewTeam,
]);

const ANALYST: PermissionSet = PermissionSet::of(&[
    ViewTasks,
    ViewPr,
    ViewAnalytics,
    ExportData,
    ViewTalents,
    ViewTeam,
]);

const VIEWER: PermissionSet =
    PermissionSet::of(&[ViewTasks, ViewPr, ViewAnalytics, ViewTalents, ViewTeam]);

const GUEST: PermissionSet = PermissionSet::of(&[ViewPr, ViewTalents]);

const TALENT: PermissionSet = PermissionSet::of(&[ViewTasks, ViewPr, ViewAnalytics, ViewTalents]);

const FREELANCER: PermissionSet = PermissionSet::of(&[
    CreateTasks,
    EditTasks,
    ViewTasks,
    CreatePr,
    EditPr,
    ViewPr,
    ViewAnalytics,
    ViewTalents,
]);

const CLIENT: PermissionSet = PermissionSet::of(&[ViewPr, ViewTalents]);

const BOT: PermissionSet = PermissionSet::of(&[ViewTasks, ViewPr, ViewAnalytics]);

/// Ordering key for the role hierarchy.
pub const fn weight_of(role: Role) -> u8 {
    role.weight()
}

/// Exact permission set carried by `role`.
pub const fn permissions_of(role: Role) -> PermissionSet {
    match role {
        Role::Owner | Role::Admin => FULL_CONTROL,
        Role::Manager => MANAGER,
        Role::Editor => EDITOR,
        Role::Approver => APPROVER,
        Role::Analyst => ANALYST,
        Role::Viewer => VIEWER,
        Role::Guest => GUEST,
        Role::Talent => TALENT,
        Role::Freelancer => FREELANCER,
        Role::Client => CLIENT,
        Role::Bot => BOT,
    }
}

/// Weight for a role given by name. Unknown names rank below every real role.
pub fn weight_of_name(name: &str) -> u8 {
    Role::parse(name).map(weight_of).unwrap_or(0)
}

/// Permissions for a role given by name. Unknown names carry nothing.
pub fn permissions_of_name(name: &str) -> PermissionSet {
    Role::parse(name)
        .map(permissions_of)
        .unwrap_or_else(PermissionSet::empty)
}

// ─────────────────────────────────────────────────────────────────────────────
// Inspection
// ─────────────────────────────────────────────────────────────────────────────

/// Role definition with its granted permissions (for audit/display).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleDefinition {
    pub name: Role,
    pub weight: u8,
    pub description: &'static str,
    pub permissions: PermissionSet,
}

/// Permission definition (for audit/display).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionDefinition {
    pub name: Permission,
    pub category: PermissionCategory,
    pub description: &'static str,
    /// Roles carrying this permission, highest weight first.
    pub granted_to: Vec<Role>,
}

/// A place where a higher-weight role does not carry a permission that the
/// role directly below it does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonotonicityGap {
    pub higher: Role,
    pub lower: Role,
    pub missing: PermissionSet,
}

/// Read-only view of the full RBAC table.
#[derive(Debug, Clone, Serialize)]
pub struct RbacRegistry {
    pub roles: Vec<RoleDefinition>,
    pub permissions: Vec<PermissionDefinition>,
}

impl RbacRegistry {
    pub fn standard() -> Self {
        let roles = Role::ALL.into_iter().map(role_definition).collect();
        let permissions = Permission::ALL.into_iter().map(permission_definition).collect();
        Self { roles, permissions }
    }

    pub fn role(&self, name: &str) -> Option<&RoleDefinition> {
        self.roles.iter().find(|r| r.name.as_str() == name)
    }

    pub fn permission(&self, name: &str) -> Option<&PermissionDefinition> {
        self.permissions.iter().find(|p| p.name.as_str() == name)
    }
}

pub fn role_definition(role: Role) -> RoleDefinition {
    RoleDefinition {
        name: role,
        weight: weight_of(role),
        description: role.description(),
        permissions: permissions_of(role),
    }
}

pub fn permission_definition(permission: Permission) -> PermissionDefinition {
    PermissionDefinition {
        name: permission,
        category: permission.category(),
        description: permission.description(),
        granted_to: Role::ALL
            .into_iter()
            .filter(|r| permissions_of(*r).contains(permission))
            .collect(),
    }
}

/// Adjacent-weight pairs where the table is not a superset chain.
///
/// The table is intentionally not a strict superset ordering (a freelancer can
/// create tasks, a guest cannot); this makes every such exception visible.
pub fn monotonicity_gaps() -> Vec<MonotonicityGap> {
    Role::ALL
        .windows(2)
        .filter_map(|pair| {
            let (higher, lower) = (pair[0], pair[1]);
            let missing = permissions_of(lower).difference(permissions_of(higher));
            (!missing.is_empty()).then_some(MonotonicityGap { higher, lower, missing })
        })
        .collect()
}

/// Lowest-weight roles whose permission set contains all of `required`.
pub fn roles_granting(required: PermissionSet) -> Vec<Role> {
    let mut roles: Vec<Role> = Role::ALL
        .into_iter()
        .filter(|r| required.is_subset(permissions_of(*r)))
        .collect();
    roles.sort_by_key(|r| weight_of(*r));
    roles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_and_admin_carry_everything() {
        assert_eq!(permissions_of(Role::Owner), PermissionSet::all());
        assert_eq!(permissions_of(Role::Admin), PermissionSet::all());
    }

    #[test]
    fn manager_lacks_only_manage_users() {
        let missing = PermissionSet::all().difference(permissions_of(Role::Manager));
        assert_eq!(missing, PermissionSet::from(ManageUsers));
    }

    #[test]
    fn unknown_names_fail_closed() {
        assert_eq!(weight_of_name("root"), 0);
        assert!(permissions_of_name("root").is_empty());
        assert_eq!(weight_of_name("viewer"), 40);
        assert_eq!(permissions_of_name("guest"), permissions_of(Role::Guest));
    }

    #[test]
    fn unknown_name_ranks_below_every_role() {
        for role in Role::ALL {
            assert!(weight_of_name("nobody") < weight_of(role));
        }
    }

    #[test]
    fn gaps_are_reported_where_the_chain_breaks() {
        let gaps = monotonicity_gaps();

        // Editor → approver: approver can approve tasks, editor cannot.
        assert!(gaps.iter().any(|g| g.higher == Role::Editor
            && g.lower == Role::Approver
            && g.missing.contains(ApproveTasks)));

        // Guest → talent: talent sees tasks and analytics.
        assert!(gaps.iter().any(|g| g.higher == Role::Guest && g.lower == Role::Talent));

        // Owner → admin is a clean superset.
        assert!(!gaps.iter().any(|g| g.higher == Role::Owner));
    }

    #[test]
    fn registry_lookup_by_name() {
        let registry = RbacRegistry::standard();
        assert_eq!(registry.roles.len(), 12);
        assert_eq!(registry.permissions.len(), 17);

        let manager = registry.role("manager").unwrap();
        assert_eq!(manager.weight, 80);
        assert!(registry.role("superuser").is_none());

        let manage_users = registry.permission("manage_users").unwrap();
        assert_eq!(manage_users.granted_to, vec![Role::Owner, Role::Admin]);
    }

    #[test]
    fn roles_granting_orders_lowest_weight_first() {
        let roles = roles_granting(PermissionSet::from(CreateTasks));
        assert_eq!(roles.first(), Some(&Role::Freelancer));
        assert_eq!(roles.last(), Some(&Role::Owner));

        assert_eq!(roles_granting(PermissionSet::from(ManageUsers)), vec![Role::Admin, Role::Owner]);
    }
}
