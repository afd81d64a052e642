use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use talentdesk_auth::{Permission, Scope};
use talentdesk_infra::NewMembership;

use crate::app::{dto, errors, services::AppServices};
use crate::authz;
use crate::context::PrincipalContext;

/// POST /invites - Grant one role across several talents (org-wide when
/// `talent_ids` is empty)
///
/// Every scope is authorized before anything is granted: one denied talent
/// rejects the whole invite.
pub async fn invite(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(req): Json<dto::InviteRequest>,
) -> axum::response::Response {
    let (principal_id, role) = match (dto::parse_principal_id(&req.principal_id), dto::parse_role(&req.role)) {
        (Ok(p), Ok(r)) => (p, r),
        (Err(resp), _) | (_, Err(resp)) => return resp,
    };

    let mut scope_ids = Vec::with_capacity(req.talent_ids.len());
    for raw in &req.talent_ids {
        match dto::parse_scope_id(raw) {
            Ok(id) if !scope_ids.contains(&Some(id.clone())) => scope_ids.push(Some(id)),
            Ok(_) => {}
            Err(resp) => return resp,
        }
    }
    if scope_ids.is_empty() {
        scope_ids.push(None);
    }

    let gate = authz::gate_for(&services, &principal).await;
    for scope_id in &scope_ids {
        let scope = Scope::from_option(scope_id.clone());
        if let Err(e) = authz::require_to_manage(&gate, &scope, Permission::InviteUsers, role) {
            return errors::authz_error_to_response(e);
        }
    }

    let mut granted = Vec::with_capacity(scope_ids.len());
    for scope in scope_ids {
        match services.store().grant(NewMembership { principal_id, role, scope }).await {
            Ok(m) => granted.push(m),
            Err(e) => {
                tracing::error!(
                    %principal_id,
                    granted = granted.len(),
                    "invite interrupted by store failure"
                );
                return errors::store_error_to_response(e);
            }
        }
    }

    tracing::info!(
        actor = %principal.principal_id(),
        %principal_id,
        %role,
        scopes = granted.len(),
        "invite granted"
    );
    (StatusCode::CREATED, Json(serde_json::json!({ "memberships": granted }))).into_response()
}
