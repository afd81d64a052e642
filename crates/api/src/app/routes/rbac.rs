//! RBAC audit endpoints: the role table, the permission table, and
//! "why was this denied?" explanations.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use talentdesk_auth::{explain, monotonicity_gaps, Permission, RbacRegistry, Requirement, Scope};

use crate::app::{dto, errors, services::AppServices};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/roles", get(list_roles))
        .route("/roles/:name", get(get_role))
        .route("/permissions", get(list_permissions))
        .route("/permissions/:name", get(get_permission))
        .route("/policy/gaps", get(policy_gaps))
        .route("/explain", get(explain_authorization))
}

/// GET /rbac/roles - All roles, heaviest first, with their permissions
pub async fn list_roles() -> axum::response::Response {
    let registry = RbacRegistry::standard();
    (StatusCode::OK, Json(serde_json::json!({ "roles": registry.roles }))).into_response()
}

/// GET /rbac/roles/:name
pub async fn get_role(Path(name): Path<String>) -> axum::response::Response {
    let registry = RbacRegistry::standard();
    match registry.role(&name) {
        Some(role) => (StatusCode::OK, Json(serde_json::json!({ "role": role }))).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "role not found"),
    }
}

/// GET /rbac/permissions
pub async fn list_permissions() -> axum::response::Response {
    let registry = RbacRegistry::standard();
    (StatusCode::OK, Json(serde_json::json!({ "permissions": registry.permissions }))).into_response()
}

/// GET /rbac/permissions/:name
pub async fn get_permission(Path(name): Path<String>) -> axum::response::Response {
    let registry = RbacRegistry::standard();
    match registry.permission(&name) {
        Some(perm) => {
            (StatusCode::OK, Json(serde_json::json!({ "permission": perm }))).into_response()
        }
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "permission not found"),
    }
}

/// GET /rbac/policy/gaps - Adjacent roles where the lower one holds
/// permissions the higher one lacks
pub async fn policy_gaps(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let gate = authz::gate_for(&services, &principal).await;
    if let Err(e) = authz::require_permission(&gate, &Scope::Organization, Permission::ManageUsers) {
        return errors::authz_error_to_response(e);
    }

    (StatusCode::OK, Json(serde_json::json!({ "gaps": monotonicity_gaps() }))).into_response()
}

/// GET /rbac/explain?permission=X|role=Y&talent_id=Z&principal_id=P - Explain
/// whether the caller (or, with org-wide `manage_users`, principal P) meets a
/// requirement in a scope
pub async fn explain_authorization(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::ExplainQuery>,
) -> axum::response::Response {
    let requirement = match (query.permission.as_deref(), query.role.as_deref()) {
        (Some(p), None) => match dto::parse_permission(p) {
            Ok(p) => Requirement::permission(p),
            Err(resp) => return resp,
        },
        (None, Some(r)) => match dto::parse_role(r) {
            Ok(r) => Requirement::minimum_role(r),
            Err(resp) => return resp,
        },
        _ => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_query",
                "exactly one of 'permission' or 'role' is required",
            );
        }
    };

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
    let explanation = explain(&gate, &scope, &requirement);

    (StatusCode::OK, Json(serde_json::json!({ "explanation": explanation }))).into_response()
}
