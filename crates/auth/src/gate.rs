//! Access gate: one decision point combining resolution and permission checks.
//!
//! The gate never redirects or denies by itself; callers act on the
//! [`Decision`]. It is evaluated fresh on every call and keeps no cache.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::{can_manage, has_all_permissions, has_any_permission, has_permission, is_one_of};
use crate::resolver::{resolve, Resolution};
use crate::{Membership, Permission, PermissionSet, PrincipalId, Role, Scope};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    All,
    #[default]
    Any,
}

/// What a call site requires of the principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requirement {
    Permission { permission: Permission },
    Permissions { permissions: PermissionSet, mode: MatchMode },
    /// The effective role must rank at least as high as `role`.
    MinimumRole { role: Role },
    /// The effective role must be one of `roles`.
    AnyRole { roles: Vec<Role> },
}

impl Requirement {
    pub fn permission(permission: Permission) -> Self {
        Requirement::Permission { permission }
    }

    pub fn all_of(permissions: impl Into<PermissionSet>) -> Self {
        Requirement::Permissions { permissions: permissions.into(), mode: MatchMode::All }
    }

    pub fn any_of(permissions: impl Into<PermissionSet>) -> Self {
        Requirement::Permissions { permissions: permissions.into(), mode: MatchMode::Any }
    }

    pub fn minimum_role(role: Role) -> Self {
        Requirement::MinimumRole { role }
    }

    pub fn any_role(roles: impl Into<Vec<Role>>) -> Self {
        Requirement::AnyRole { roles: roles.into() }
    }

    pub fn is_satisfied_by(&self, role: Role) -> bool {
        match self {
            Requirement::Permission { permission } => has_permission(role, *permission),
            Requirement::Permissions { permissions, mode: MatchMode::All } => {
                has_all_permissions(role, *permissions)
            }
            Requirement::Permissions { permissions, mode: MatchMode::Any } => {
                has_any_permission(role, *permissions)
            }
            Requirement::MinimumRole { role: required } => can_manage(role, *required),
            Requirement::AnyRole { roles } => is_one_of(role, roles),
        }
    }

    /// Permissions the requirement refers to (empty for role requirements).
    pub fn permissions(&self) -> PermissionSet {
        match self {
            Requirement::Permission { permission } => PermissionSet::from(*permission),
            Requirement::Permissions { permissions, .. } => *permissions,
            Requirement::MinimumRole { .. } | Requirement::AnyRole { .. } => PermissionSet::empty(),
        }
    }
}

impl core::fmt::Display for Requirement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Requirement::Permission { permission } => write!(f, "permission '{permission}'"),
            Requirement::Permissions { permissions, mode } => {
                let names: Vec<&str> = permissions.iter().map(Permission::as_str).collect();
                let mode = match mode {
                    MatchMode::All => "all",
                    MatchMode::Any => "any",
                };
                write!(f, "{mode} of [{}]", names.join(", "))
            }
            Requirement::MinimumRole { role } => write!(f, "role '{role}' or higher"),
            Requirement::AnyRole { roles } => {
                let names: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
                write!(f, "one of roles [{}]", names.join(", "))
            }
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: {requirement} required, effective role is '{effective_role}' in {scope}")]
    Forbidden {
        requirement: Requirement,
        effective_role: Role,
        scope: Scope,
    },

    #[error("forbidden: role '{actor}' cannot manage role '{target}'")]
    OutrankedTarget { actor: Role, target: Role },
}

/// Outcome of one gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub allowed: bool,
    pub effective_role: Role,
    pub resolution: Resolution,
    pub scope: Scope,
    pub requirement: Requirement,
}

impl Decision {
    /// `Ok(effective_role)` when allowed.
    pub fn into_result(self) -> Result<Role, AuthzError> {
        if self.allowed {
            Ok(self.effective_role)
        } else {
            Err(AuthzError::Forbidden {
                requirement: self.requirement,
                effective_role: self.effective_role,
                scope: self.scope,
            })
        }
    }
}

/// Decide whether a principal holding `memberships` satisfies `requirement`
/// in `scope`.
pub fn evaluate(memberships: &[Membership], scope: &Scope, requirement: &Requirement) -> Decision {
    decide(resolve(memberships, scope), scope, requirement)
}

/// Evaluate a requirement against an already-computed resolution.
pub fn decide(resolution: Resolution, scope: &Scope, requirement: &Requirement) -> Decision {
    Decision {
        allowed: requirement.is_satisfied_by(resolution.role),
        effective_role: resolution.role,
        resolution,
        scope: scope.clone(),
        requirement: requirement.clone(),
    }
}

/// Guard for actions that assign, remove or edit a role: the actor must
/// outrank (or equal) the role being touched.
pub fn ensure_can_manage(actor: Role, target: Role) -> Result<(), AuthzError> {
    if can_manage(actor, target) {
        Ok(())
    } else {
        Err(AuthzError::OutrankedTarget { actor, target })
    }
}

/// A principal's membership snapshot, ready to answer gate questions.
///
/// The snapshot is taken once per request; a membership change requires a new
/// gate.
#[derive(Debug, Clone)]
pub struct AccessGate {
    principal_id: PrincipalId,
    memberships: Vec<Membership>,
    store_unavailable: bool,
}

impl AccessGate {
    /// Memberships belonging to other principals are ignored.
    pub fn new(principal_id: PrincipalId, memberships: Vec<Membership>) -> Self {
        let memberships = memberships
            .into_iter()
            .filter(|m| m.principal_id == principal_id)
            .collect();
        Self { principal_id, memberships, store_unavailable: false }
    }

    /// A gate for a principal whose memberships could not be loaded.
    ///
    /// Every resolution falls back with [`crate::FallbackReason::StoreUnavailable`].
    pub fn unavailable(principal_id: PrincipalId) -> Self {
        Self { principal_id, memberships: Vec::new(), store_unavailable: true }
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    pub fn memberships(&self) -> &[Membership] {
        &self.memberships
    }

    pub fn is_store_unavailable(&self) -> bool {
        self.store_unavailable
    }

    pub fn resolve(&self, scope: &Scope) -> Resolution {
        if self.store_unavailable {
            return Resolution::fallback(crate::FallbackReason::StoreUnavailable);
        }
        resolve(&self.memberships, scope)
    }

    pub fn effective_role(&self, scope: &Scope) -> Role {
        self.resolve(scope).role
    }

    pub fn check(&self, scope: &Scope, requirement: &Requirement) -> Decision {
        decide(self.resolve(scope), scope, requirement)
    }

    /// Like [`AccessGate::check`], but denial is an error.
    pub fn require(&self, scope: &Scope, requirement: &Requirement) -> Result<Role, AuthzError> {
        let decision = self.check(scope, requirement);
        if !decision.allowed {
            tracing::debug!(
                principal_id = %self.principal_id,
                %scope,
                %requirement,
                effective_role = %decision.effective_role,
                "access denied"
            );
        }
        decision.into_result()
    }
}
