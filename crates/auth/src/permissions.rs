use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Permission identifier: a single allowed action.
///
/// Permissions are atomic; there is no hierarchy among them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    CreateTasks,
    EditTasks,
    ApproveTasks,
    DeleteTasks,
    ViewTasks,
    CreatePr,
    EditPr,
    DeletePr,
    ViewPr,
    ViewAnalytics,
    ExportData,
    ManageUsers,
    InviteUsers,
    ManageTalents,
    ViewTalents,
    ManageTeam,
    ViewTeam,
}

/// Grouping used when listing permissions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionCategory {
    Tasks,
    Pr,
    Analytics,
    Users,
    Talents,
    Team,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown permission '{0}'")]
pub struct ParsePermissionError(pub String);

impl Permission {
    pub const ALL: [Permission; 17] = [
        Permission::CreateTasks,
        Permission::EditTasks,
        Permission::ApproveTasks,
        Permission::DeleteTasks,
        Permission::ViewTasks,
        Permission::CreatePr,
        Permission::EditPr,
        Permission::DeletePr,
        Permission::ViewPr,
        Permission::ViewAnalytics,
        Permission::ExportData,
        Permission::ManageUsers,
        Permission::InviteUsers,
        Permission::ManageTalents,
        Permission::ViewTalents,
        Permission::ManageTeam,
        Permission::ViewTeam,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Permission::CreateTasks => "create_tasks",
            Permission::EditTasks => "edit_tasks",
            Permission::ApproveTasks => "approve_tasks",
            Permission::DeleteTasks => "delete_tasks",
            Permission::ViewTasks => "view_tasks",
            Permission::CreatePr => "create_pr",
            Permission::EditPr => "edit_pr",
            Permission::DeletePr => "delete_pr",
            Permission::ViewPr => "view_pr",
            Permission::ViewAnalytics => "view_analytics",
            Permission::ExportData => "export_data",
            Permission::ManageUsers => "manage_users",
            Permission::InviteUsers => "invite_users",
            Permission::ManageTalents => "manage_talents",
            Permission::ViewTalents => "view_talents",
            Permission::ManageTeam => "manage_team",
            Permission::ViewTeam => "view_team",
        }
    }

    pub const fn category(self) -> PermissionCategory {
        match self {
            Permission::CreateTasks
            | Permission::EditTasks
            | Permission::ApproveTasks
            | Permission::DeleteTasks
            | Permission::ViewTasks => PermissionCategory::Tasks,
            Permission::CreatePr | Permission::EditPr | Permission::DeletePr | Permission::ViewPr => {
                PermissionCategory::Pr
            }
            Permission::ViewAnalytics | Permission::ExportData => PermissionCategory::Analytics,
            Permission::ManageUsers | Permission::InviteUsers => PermissionCategory::Users,
            Permission::ManageTalents | Permission::ViewTalents => PermissionCategory::Talents,
            Permission::ManageTeam | Permission::ViewTeam => PermissionCategory::Team,
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Permission::CreateTasks => "Create new tasks",
            Permission::EditTasks => "Edit existing tasks",
            Permission::ApproveTasks => "Approve or reject submitted tasks",
            Permission::DeleteTasks => "Delete tasks",
            Permission::ViewTasks => "View tasks",
            Permission::CreatePr => "Create PR items",
            Permission::EditPr => "Edit PR items",
            Permission::DeletePr => "Delete PR items",
            Permission::ViewPr => "View PR items and opportunities",
            Permission::ViewAnalytics => "View analytics dashboards",
            Permission::ExportData => "Export data and reports",
            Permission::ManageUsers => "Grant and revoke memberships",
            Permission::InviteUsers => "Invite new members",
            Permission::ManageTalents => "Create, edit and delete talents",
            Permission::ViewTalents => "View talents",
            Permission::ManageTeam => "Manage team members",
            Permission::ViewTeam => "View team members",
        }
    }

    /// Parse a permission name, returning `None` for unknown names.
    pub fn parse(name: &str) -> Option<Self> {
        Permission::ALL.into_iter().find(|p| p.as_str() == name)
    }

    const fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = ParsePermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::parse(s).ok_or_else(|| ParsePermissionError(s.to_string()))
    }
}

impl PermissionCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            PermissionCategory::Tasks => "tasks",
            PermissionCategory::Pr => "pr",
            PermissionCategory::Analytics => "analytics",
            PermissionCategory::Users => "users",
            PermissionCategory::Talents => "talents",
            PermissionCategory::Team => "team",
        }
    }
}

/// A set of permissions, stored as a bitset over [`Permission`].
///
/// `Copy` and allocation-free, so permission tables can be `const`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct PermissionSet(u32);

impl PermissionSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        Self::of(&Permission::ALL)
    }

    pub const fn of(permissions: &[Permission]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < permissions.len() {
            bits |= permissions[i].bit();
            i += 1;
        }
        Self(bits)
    }

    pub const fn contains(self, permission: Permission) -> bool {
        self.0 & permission.bit() != 0
    }

    pub const fn with(self, permission: Permission) -> Self {
        Self(self.0 | permission.bit())
    }

    pub const fn without(self, permission: Permission) -> Self {
        Self(self.0 & !permission.bit())
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Permissions in `self` that are not in `other`.
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub const fn is_subset(self, other: Self) -> bool {
        self.0 & !other.0 == 0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Permission> {
        Permission::ALL.into_iter().filter(move |p| self.contains(*p))
    }

    pub fn to_vec(self) -> Vec<Permission> {
        self.iter().collect()
    }
}

impl core::fmt::Debug for PermissionSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), |set, p| set.with(p))
    }
}

impl From<&[Permission]> for PermissionSet {
    fn from(value: &[Permission]) -> Self {
        Self::of(value)
    }
}

impl<const N: usize> From<[Permission; N]> for PermissionSet {
    fn from(value: [Permission; N]) -> Self {
        Self::of(&value)
    }
}

impl From<Permission> for PermissionSet {
    fn from(value: Permission) -> Self {
        Self::empty().with(value)
    }
}

impl Serialize for PermissionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for PermissionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let list = Vec::<Permission>::deserialize(deserializer)?;
        Ok(list.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_permission_has_a_distinct_bit() {
        assert_eq!(PermissionSet::all().len(), Permission::ALL.len());
    }

    #[test]
    fn set_algebra() {
        let a = PermissionSet::of(&[Permission::ViewPr, Permission::ViewTasks]);
        let b = PermissionSet::of(&[Permission::ViewPr, Permission::ExportData]);

        assert_eq!(a.intersection(b), PermissionSet::from(Permission::ViewPr));
        assert_eq!(a.union(b).len(), 3);
        assert_eq!(a.difference(b), PermissionSet::from(Permission::ViewTasks));
        assert!(a.intersects(b));
        assert!(!a.is_subset(b));
        assert!(PermissionSet::empty().is_subset(a));
        assert!(a.without(Permission::ViewTasks).is_subset(b));
    }

    #[test]
    fn serializes_as_sorted_name_list() {
        let set = PermissionSet::of(&[Permission::ViewTeam, Permission::CreateTasks]);
        let json = serde_json::to_value(set).unwrap();
        assert_eq!(json, serde_json::json!(["create_tasks", "view_team"]));

        let back: PermissionSet = serde_json::from_value(json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn unknown_permission_name_is_rejected() {
        assert!("delete_everything".parse::<Permission>().is_err());
        assert_eq!("export_data".parse::<Permission>().unwrap(), Permission::ExportData);
    }
}
