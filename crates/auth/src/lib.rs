//! Pure authentication/authorization core.
//!
//! Role hierarchy, permission table, effective-role resolution and the access
//! gate. No HTTP, no storage: memberships are handed in by the caller.

pub mod claims;
pub mod explain;
pub mod gate;
pub mod jwt;
pub mod permissions;
pub mod principal;
pub mod query;
pub mod registry;
pub mod resolver;
pub mod roles;

pub use claims::{CLOCK_SKEW_LEEWAY_SECS, JwtClaims, TokenValidationError, validate_claims};
pub use explain::{AuthorizationExplanation, DenialKind, DenialReason, explain};
pub use gate::{AccessGate, AuthzError, Decision, MatchMode, Requirement, ensure_can_manage, evaluate};
pub use jwt::{Hs256JwtValidator, JwtError, JwtValidator};
pub use permissions::{ParsePermissionError, Permission, PermissionCategory, PermissionSet};
pub use principal::{Membership, PrincipalId, Scope};
pub use query::{can_manage, has_all_permissions, has_any_permission, has_permission, is_one_of};
pub use registry::{
    MonotonicityGap, PermissionDefinition, RbacRegistry, RoleDefinition, monotonicity_gaps,
    permissions_of, permissions_of_name, weight_of, weight_of_name,
};
pub use resolver::{
    FALLBACK_ROLE, FallbackReason, Resolution, ResolutionSource, effective_role, is_candidate, resolve,
};
pub use roles::{ParseRoleError, Role};

#[cfg(test)]
mod properties {
    use proptest::prelude::*;
    use talentdesk_core::ScopeId;

    use super::*;

    fn any_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    fn any_scope_id() -> impl Strategy<Value = Option<ScopeId>> {
        prop::option::of((0u8..4).prop_map(|n| ScopeId::new(format!("talent-{n}")).unwrap()))
    }

    fn any_memberships(p: PrincipalId) -> impl Strategy<Value = Vec<Membership>> {
        prop::collection::vec((any_role(), any_scope_id()), 0..8)
            .prop_map(move |v| v.into_iter().map(|(r, s)| Membership::new(p, r, s)).collect())
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: granting a membership and resolving in its scope never
        /// yields a weaker role than the one granted.
        #[test]
        fn grant_then_resolve_is_at_least_granted(
            role in any_role(),
            scope in any_scope_id(),
            existing in any_memberships(PrincipalId::from_uuid(uuid::Uuid::nil())),
        ) {
            let p = PrincipalId::from_uuid(uuid::Uuid::nil());
            let mut memberships = existing;
            let granted = Membership::new(p, role, scope);
            let requested = granted.grant_scope();
            memberships.push(granted);

            let effective = effective_role(&memberships, &requested);
            prop_assert!(weight_of(effective) >= weight_of(role));
        }

        /// Property: the effective role is a candidate's role, or the fallback
        /// when there is no candidate.
        #[test]
        fn effective_role_comes_from_a_candidate(
            memberships in any_memberships(PrincipalId::from_uuid(uuid::Uuid::nil())),
            scope in any_scope_id(),
        ) {
            let scope = Scope::from_option(scope);
            let candidates: Vec<&Membership> =
                memberships.iter().filter(|m| is_candidate(m, &scope)).collect();
            let r = resolve(&memberships, &scope);

            match candidates.iter().map(|m| m.role.weight()).max() {
                None => prop_assert_eq!(r.role, FALLBACK_ROLE),
                Some(max) => prop_assert_eq!(r.role.weight(), max),
            }
        }

        /// Property: resolution does not depend on input order.
        #[test]
        fn resolution_is_order_independent(
            memberships in any_memberships(PrincipalId::from_uuid(uuid::Uuid::nil())),
            scope in any_scope_id(),
        ) {
            let scope = Scope::from_option(scope);
            let mut reversed = memberships.clone();
            reversed.reverse();
            prop_assert_eq!(effective_role(&memberships, &scope), effective_role(&reversed, &scope));
        }
    }
}
