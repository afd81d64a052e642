use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role identifier used for RBAC.
///
/// Roles form a closed, totally ordered set. The order is given by
/// [`Role::weight`]; every pair of roles is comparable and no two roles share
/// a weight.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Manager,
    Editor,
    Approver,
    Analyst,
    Viewer,
    Guest,
    Talent,
    Freelancer,
    Client,
    Bot,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct ParseRoleError(pub String);

impl Role {
    /// Every role, highest weight first.
    pub const ALL: [Role; 12] = [
        Role::Owner,
        Role::Admin,
        Role::Manager,
        Role::Editor,
        Role::Approver,
        Role::Analyst,
        Role::Viewer,
        Role::Guest,
        Role::Talent,
        Role::Freelancer,
        Role::Client,
        Role::Bot,
    ];

    /// Hierarchy weight (higher = more privileged).
    pub const fn weight(self) -> u8 {
        match self {
            Role::Owner => 100,
            Role::Admin => 90,
            Role::Manager => 80,
            Role::Editor => 70,
            Role::Approver => 60,
            Role::Analyst => 50,
            Role::Viewer => 40,
            Role::Guest => 30,
            Role::Talent => 20,
            Role::Freelancer => 15,
            Role::Client => 10,
            Role::Bot => 5,
        }
    }

    /// Permissions granted by this role.
    pub const fn permissions(self) -> crate::PermissionSet {
        crate::registry::permissions_of(self)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Editor => "editor",
            Role::Approver => "approver",
            Role::Analyst => "analyst",
            Role::Viewer => "viewer",
            Role::Guest => "guest",
            Role::Talent => "talent",
            Role::Freelancer => "freelancer",
            Role::Client => "client",
            Role::Bot => "bot",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Role::Owner => "Full control over all talents and organization settings",
            Role::Admin => "Organization-wide full control and user management",
            Role::Manager => "Manage assigned talents, invite and edit members",
            Role::Editor => "Create and edit tasks, PR, and opportunities",
            Role::Approver => "Can approve/reject tasks and content",
            Role::Analyst => "Read-only access with export capabilities",
            Role::Viewer => "Read-only access to assigned talents",
            Role::Guest => "Limited read-only access to PR and opportunities",
            Role::Talent => "Self-service view of own profile and tasks",
            Role::Freelancer => "Time-boxed editor access, cannot invite others",
            Role::Client => "Brand/agency read-only with commenting on opportunities",
            Role::Bot => "Automated system access for integrations",
        }
    }

    /// Parse a role name, returning `None` for unknown names.
    pub fn parse(name: &str) -> Option<Self> {
        Role::ALL.into_iter().find(|r| r.as_str() == name)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| ParseRoleError(s.to_string()))
    }
}
