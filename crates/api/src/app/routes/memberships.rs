use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use talentdesk_auth::{Permission, Scope, ensure_can_manage};
use talentdesk_core::MembershipId;
use talentdesk_infra::NewMembership;

use crate::app::{dto, errors, services::AppServices};
use crate::authz;
use crate::context::PrincipalContext;

/// GET /memberships?principal_id=X - A principal's memberships (own, or any
/// with org-wide `manage_users`)
pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::MembershipsQuery>,
) -> axum::response::Response {
    let target = match query.principal_id.as_deref().map(dto::parse_principal_id).transpose() {
        Ok(t) => t.unwrap_or(principal.principal_id()),
        Err(resp) => return resp,
    };

    if target != principal.principal_id() {
        let gate = authz::gate_for(&services, &principal).await;
        if let Err(e) = authz::require_permission(&gate, &Scope::Organization, Permission::ManageUsers) {
            return errors::authz_error_to_response(e);
        }
    }

    match services.store().list_for_principal(target).await {
        Ok(memberships) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "principal_id": target.to_string(),
                "memberships": memberships,
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// POST /memberships - Grant a role in a scope
pub async fn grant(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(req): Json<dto::GrantMembershipRequest>,
) -> axum::response::Response {
    let (principal_id, role, scope) = match (
        dto::parse_principal_id(&req.principal_id),
        dto::parse_role(&req.role),
        dto::parse_scope(req.talent_id.as_deref()),
    ) {
        (Ok(p), Ok(r), Ok(s)) => (p, r, s),
        (Err(resp), _, _) | (_, Err(resp), _) | (_, _, Err(resp)) => return resp,
    };
    let scope_id = scope.scope_id().cloned();

    // Authorization is checked against a fresh snapshot at the point of mutation.
    let gate = authz::gate_for(&services, &principal).await;
    if let Err(e) = authz::require_to_manage(&gate, &scope, Permission::ManageUsers, role) {
        return errors::authz_error_to_response(e);
    }

    match services.store().grant(NewMembership { principal_id, role, scope: scope_id }).await {
        Ok(membership) => {
            tracing::info!(
                actor = %principal.principal_id(),
                %principal_id,
                %role,
                %scope,
                membership_id = %membership.id,
                "membership granted"
            );
            (StatusCode::CREATED, Json(serde_json::json!({ "membership": membership }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// DELETE /memberships/:id - Revoke a membership
pub async fn revoke(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match id.parse::<MembershipId>() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let gate = authz::gate_for(&services, &principal).await;

    let existing = match services.store().get(id).await {
        Ok(Some(m)) => m,
        Ok(None) => return not_found(),
        Err(e) => return errors::store_error_to_response(e),
    };

    // Without `manage_users` in the membership's scope the caller cannot tell
    // it apart from a missing one.
    let scope = existing.grant_scope();
    let actor = match authz::require_permission(&gate, &scope, Permission::ManageUsers) {
        Ok(role) => role,
        Err(_) => return not_found(),
    };
    if let Err(e) = ensure_can_manage(actor, existing.role) {
        return errors::authz_error_to_response(e);
    }

    match services.store().revoke(id).await {
        Ok(Some(membership)) => {
            tracing::info!(
                actor = %principal.principal_id(),
                principal_id = %membership.principal_id,
                role = %membership.role,
                membership_id = %membership.id,
                "membership revoked"
            );
            (StatusCode::OK, Json(serde_json::json!({ "membership": membership }))).into_response()
        }
        Ok(None) => not_found(),
        Err(e) => errors::store_error_to_response(e),
    }
}

fn not_found() -> axum::response::Response {
    errors::json_error(StatusCode::NOT_FOUND, "not_found", "membership not found")
}
