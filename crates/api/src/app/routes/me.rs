use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use talentdesk_auth::permissions_of;

use crate::app::{dto, errors, services::AppServices};
use crate::authz;
use crate::context::PrincipalContext;

/// GET /me/effective-role?talent_id=X&principal_id=Y - Effective role in a
/// scope, for the caller or (with org-wide `manage_users`) another principal
pub async fn effective_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::EffectiveRoleQuery>,
) -> axum::response::Response {
    let scope = match dto::parse_scope(query.talent_id.as_deref()) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let target = match dto::parse_target(query.principal_id.as_deref(), principal.principal_id()) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    let gate = match authz::gate_for_target(&services, &principal, target).await {
        Ok(g) => g,
        Err(e) => return errors::authz_error_to_response(e),
    };
    let resolution = gate.resolve(&scope);

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "principal_id": target.to_string(),
            "scope": scope,
            "role": resolution.role,
            "weight": resolution.role.weight(),
            "source": resolution.source,
            "permissions": permissions_of(resolution.role),
            "memberships": gate.memberships(),
        })),
    )
        .into_response()
}
