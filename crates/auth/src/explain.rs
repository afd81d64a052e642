//! Authorization explanations (audit trail).
//!
//! Debug view for "why was this request allowed/denied?".

use serde::Serialize;

use crate::gate::{AccessGate, Requirement};
use crate::registry::{permissions_of, roles_granting};
use crate::resolver::{is_candidate, Resolution};
use crate::{Membership, PermissionSet, PrincipalId, Role, Scope};

/// Detailed explanation of an authorization decision.
///
/// Answers "why was this allowed/denied?" without changing anything.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub principal_id: PrincipalId,
    pub scope: Scope,
    pub requirement: Requirement,

    /// Whether the requirement is satisfied.
    pub granted: bool,

    /// Human-readable reason for the decision.
    pub reason: String,

    pub resolution: Resolution,

    /// Permissions carried by the effective role.
    pub effective_permissions: PermissionSet,

    /// Memberships that apply to the scope.
    pub candidates: Vec<Membership>,

    /// Memberships scoped elsewhere.
    pub ignored: Vec<Membership>,

    /// If denied, this explains what was missing.
    pub denial: Option<DenialReason>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    /// Required permissions the effective role lacks.
    pub missing_permissions: PermissionSet,
    /// Lowest-weight roles that would satisfy the requirement.
    pub sufficient_roles: Vec<Role>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    MissingPermission,
    InsufficientRole,
    StoreUnavailable,
}

pub fn explain(gate: &AccessGate, scope: &Scope, requirement: &Requirement) -> AuthorizationExplanation {
    let decision = gate.check(scope, requirement);
    let role = decision.effective_role;
    let effective_permissions = permissions_of(role);

    let (candidates, ignored): (Vec<Membership>, Vec<Membership>) = gate
        .memberships()
        .iter()
        .cloned()
        .partition(|m| is_candidate(m, scope));

    let source = if decision.resolution.is_fallback() {
        format!("fallback role '{role}'")
    } else {
        format!("effective role '{role}'")
    };

    if decision.allowed {
        return AuthorizationExplanation {
            principal_id: gate.principal_id(),
            scope: scope.clone(),
            requirement: requirement.clone(),
            granted: true,
            reason: format!("{source} in {scope} satisfies {requirement}"),
            resolution: decision.resolution,
            effective_permissions,
            candidates,
            ignored,
            denial: None,
        };
    }

    let sufficient_roles = sufficient_roles(requirement);
    let missing_permissions = requirement.permissions().difference(effective_permissions);

    let kind = if gate.is_store_unavailable() {
        DenialKind::StoreUnavailable
    } else if matches!(requirement, Requirement::Permission { .. } | Requirement::Permissions { .. }) {
        DenialKind::MissingPermission
    } else {
        DenialKind::InsufficientRole
    };

    let mut suggestions = Vec::new();
    if kind == DenialKind::StoreUnavailable {
        suggestions.push("Membership store could not be read; retry once it is reachable".to_string());
    }
    if let Some(lowest) = sufficient_roles.first() {
        match requirement {
            Requirement::AnyRole { .. } => {
                suggestions.push(format!("Grant role '{lowest}' in {scope}"))
            }
            _ => suggestions.push(format!("Grant role '{lowest}' (or higher) in {scope}")),
        }
    }
    if !ignored.is_empty() && scope != &Scope::Organization {
        suggestions.push(format!(
            "{} membership(s) are scoped to other talents and do not apply here",
            ignored.len()
        ));
    }
    if candidates.is_empty() && !ignored.is_empty() && scope == &Scope::Organization {
        suggestions.push(
            "Only talent-scoped memberships exist; organization-wide actions need an org-wide grant"
                .to_string(),
        );
    }

    AuthorizationExplanation {
        principal_id: gate.principal_id(),
        scope: scope.clone(),
        requirement: requirement.clone(),
        granted: false,
        reason: format!("{source} in {scope} does not satisfy {requirement}"),
        resolution: decision.resolution,
        effective_permissions,
        candidates,
        ignored,
        denial: Some(DenialReason {
            kind,
            missing_permissions,
            sufficient_roles,
            suggestions,
        }),
    }
}

fn sufficient_roles(requirement: &Requirement) -> Vec<Role> {
    match requirement {
        Requirement::Permission { permission } => roles_granting(PermissionSet::from(*permission)),
        Requirement::Permissions { .. } => {
            let mut roles: Vec<Role> = Role::ALL
                .into_iter()
                .filter(|r| requirement.is_satisfied_by(*r))
                .collect();
            roles.sort_by_key(|r| r.weight());
            roles
        }
        Requirement::MinimumRole { role } => {
            let mut roles: Vec<Role> = Role::ALL
                .into_iter()
                .filter(|r| r.weight() >= role.weight())
                .collect();
            roles.sort_by_key(|r| r.weight());
            roles
        }
        Requirement::AnyRole { roles } => {
            let mut roles = roles.clone();
            roles.sort_by_key(|r| r.weight());
            roles.dedup();
            roles
        }
    }
}
