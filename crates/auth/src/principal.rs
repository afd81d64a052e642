use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use talentdesk_core::{MembershipId, ScopeId};

use crate::Role;

/// Identity of an authenticated principal (human user, service account, etc).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(Uuid);

impl PrincipalId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for PrincipalId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<PrincipalId> for Uuid {
    fn from(value: PrincipalId) -> Self {
        value.0
    }
}

impl FromStr for PrincipalId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// The context a permission question is asked in.
///
/// Passed explicitly into every evaluation; there is no ambient "active
/// entity".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Scope {
    /// Organization-wide: only org-wide memberships apply.
    #[default]
    Organization,
    /// One bounded sub-entity (e.g. a managed talent).
    Talent(ScopeId),
}

impl Scope {
    pub fn talent(id: ScopeId) -> Self {
        Scope::Talent(id)
    }

    /// `None` means organization-wide.
    pub fn from_option(id: Option<ScopeId>) -> Self {
        id.map_or(Scope::Organization, Scope::Talent)
    }

    pub fn scope_id(&self) -> Option<&ScopeId> {
        match self {
            Scope::Organization => None,
            Scope::Talent(id) => Some(id),
        }
    }
}

impl core::fmt::Display for Scope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Scope::Organization => f.write_str("organization"),
            Scope::Talent(id) => write!(f, "talent:{id}"),
        }
    }
}

/// A (principal, role, scope) grant.
///
/// `scope == None` means the role applies organization-wide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub id: MembershipId,
    pub principal_id: PrincipalId,
    pub role: Role,
    pub scope: Option<ScopeId>,
    pub granted_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(principal_id: PrincipalId, role: Role, scope: Option<ScopeId>) -> Self {
        Self {
            id: MembershipId::new(),
            principal_id,
            role,
            scope,
            granted_at: Utc::now(),
        }
    }

    pub fn org_wide(principal_id: PrincipalId, role: Role) -> Self {
        Self::new(principal_id, role, None)
    }

    pub fn scoped(principal_id: PrincipalId, role: Role, scope: ScopeId) -> Self {
        Self::new(principal_id, role, Some(scope))
    }

    pub fn is_org_wide(&self) -> bool {
        self.scope.is_none()
    }

    /// The scope this membership grants its role in.
    pub fn grant_scope(&self) -> Scope {
        Scope::from_option(self.scope.clone())
    }
}
