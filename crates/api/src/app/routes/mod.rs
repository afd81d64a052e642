use axum::{
    routing::{delete, get, post},
    Router,
};

pub mod invites;
pub mod me;
pub mod memberships;
pub mod rbac;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/me/effective-role", get(me::effective_role))
        .nest("/rbac", rbac::router())
        .route("/memberships", get(memberships::list).post(memberships::grant))
        .route("/memberships/:id", delete(memberships::revoke))
        .route("/invites", post(invites::invite))
}
