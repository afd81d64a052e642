//! API-side authorization guard.
//!
//! Handlers load a fresh membership snapshot for the caller and run the
//! access gate before touching the store. Nothing here trusts the token for
//! roles.

use talentdesk_auth::{
    AccessGate, AuthzError, Permission, PrincipalId, Requirement, Role, Scope, ensure_can_manage,
};

use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Membership snapshot for the calling principal.
pub async fn gate_for(services: &AppServices, principal: &PrincipalContext) -> AccessGate {
    services.lookup.gate_for(principal.principal_id()).await
}

/// Membership snapshot for `target`, which the caller may inspect when it is
/// the caller itself or when the caller holds org-wide `manage_users`.
pub async fn gate_for_target(
    services: &AppServices,
    principal: &PrincipalContext,
    target: PrincipalId,
) -> Result<AccessGate, AuthzError> {
    let own = gate_for(services, principal).await;
    if target == principal.principal_id() {
        return Ok(own);
    }
    require_permission(&own, &Scope::Organization, Permission::ManageUsers)?;
    Ok(services.lookup.gate_for(target).await)
}

/// Require `permission` in `scope`; returns the caller's effective role there.
pub fn require_permission(gate: &AccessGate, scope: &Scope, permission: Permission) -> Result<Role, AuthzError> {
    gate.require(scope, &Requirement::permission(permission))
}

/// Require `permission` in `scope`, and that the caller's effective role there
/// can manage `target`.
pub fn require_to_manage(
    gate: &AccessGate,
    scope: &Scope,
    permission: Permission,
    target: Role,
) -> Result<Role, AuthzError> {
    let actor = require_permission(gate, scope, permission)?;
    ensure_can_manage(actor, target)?;
    Ok(actor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use talentdesk_auth::Membership;
    use talentdesk_infra::InMemoryMembershipStore;
    use talentdesk_core::ScopeId;

    fn talent(id: &str) -> Scope {
        Scope::Talent(ScopeId::new(id).unwrap())
    }

    #[test]
    fn admin_cannot_manage_owner() {
        let p = PrincipalId::new();
        let gate = AccessGate::new(p, vec![Membership::org_wide(p, Role::Admin)]);

        assert_eq!(
            require_to_manage(&gate, &Scope::Organization, Permission::ManageUsers, Role::Admin),
            Ok(Role::Admin)
        );
        assert_eq!(
            require_to_manage(&gate, &Scope::Organization, Permission::ManageUsers, Role::Owner),
            Err(AuthzError::OutrankedTarget { actor: Role::Admin, target: Role::Owner })
        );
    }

    #[test]
    fn scoped_admin_is_limited_to_its_talent() {
        let p = PrincipalId::new();
        let gate = AccessGate::new(
            p,
            vec![Membership::scoped(p, Role::Admin, ScopeId::new("talent-1").unwrap())],
        );

        assert!(require_to_manage(&gate, &talent("talent-1"), Permission::ManageUsers, Role::Editor).is_ok());
        assert!(matches!(
            require_to_manage(&gate, &talent("talent-2"), Permission::ManageUsers, Role::Editor),
            Err(AuthzError::Forbidden { effective_role: Role::Guest, .. })
        ));
    }

    #[test]
    fn unavailable_gate_denies_management() {
        let gate = AccessGate::unavailable(PrincipalId::new());
        assert!(require_permission(&gate, &Scope::Organization, Permission::InviteUsers).is_err());
    }

    #[tokio::test]
    async fn inspecting_others_needs_org_wide_user_management() {
        let admin = PrincipalId::new();
        let scoped_admin = PrincipalId::new();
        let viewer = PrincipalId::new();
        let services = AppServices::new(Arc::new(InMemoryMembershipStore::with_memberships(vec![
            Membership::org_wide(admin, Role::Admin),
            Membership::scoped(scoped_admin, Role::Admin, ScopeId::new("talent-1").unwrap()),
            Membership::org_wide(viewer, Role::Viewer),
        ])));

        let as_admin = PrincipalContext::new(admin);
        let gate = gate_for_target(&services, &as_admin, viewer).await.unwrap();
        assert_eq!(gate.principal_id(), viewer);
        assert_eq!(gate.effective_role(&Scope::Organization), Role::Viewer);

        let as_viewer = PrincipalContext::new(viewer);
        assert!(gate_for_target(&services, &as_viewer, admin).await.is_err());
        assert!(gate_for_target(&services, &as_viewer, viewer).await.is_ok());

        let as_scoped = PrincipalContext::new(scoped_admin);
        assert!(gate_for_target(&services, &as_scoped, viewer).await.is_err());
    }
}
