//! Effective-role resolution.
//!
//! Reduces a principal's memberships plus a requested [`Scope`] to one
//! [`Role`]. Pure: the membership lookup happens elsewhere.

use serde::Serialize;

use talentdesk_core::MembershipId;

use crate::{Membership, Role, Scope};

/// Role used whenever no membership applies or memberships could not be read.
///
/// This is the only fallback; every call site goes through it.
pub const FALLBACK_ROLE: Role = Role::Guest;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// The principal holds no membership that applies to the scope.
    NoMemberships,
    /// The membership store could not be read.
    StoreUnavailable,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionSource {
    Membership { membership_id: MembershipId },
    Fallback { reason: FallbackReason },
}

/// Effective role plus where it came from (for display/audit).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub role: Role,
    pub source: ResolutionSource,
}

impl Resolution {
    pub fn fallback(reason: FallbackReason) -> Self {
        Self {
            role: FALLBACK_ROLE,
            source: ResolutionSource::Fallback { reason },
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, ResolutionSource::Fallback { .. })
    }
}

/// A membership applies if it is org-wide or scoped to exactly the requested
/// scope. Scoped memberships never apply to an organization-wide request.
pub fn is_candidate(membership: &Membership, scope: &Scope) -> bool {
    match &membership.scope {
        None => true,
        Some(id) => scope.scope_id() == Some(id),
    }
}

/// Highest-weight candidate wins; on equal weight the first one seen wins.
pub fn resolve(memberships: &[Membership], scope: &Scope) -> Resolution {
    let best = memberships
        .iter()
        .filter(|m| is_candidate(m, scope))
        .fold(None::<&Membership>, |best, m| match best {
            Some(b) if b.role.weight() >= m.role.weight() => Some(b),
            _ => Some(m),
        });

    match best {
        Some(m) => Resolution {
            role: m.role,
            source: ResolutionSource::Membership { membership_id: m.id },
        },
        None => Resolution::fallback(FallbackReason::NoMemberships),
    }
}

pub fn effective_role(memberships: &[Membership], scope: &Scope) -> Role {
    resolve(memberships, scope).role
}
