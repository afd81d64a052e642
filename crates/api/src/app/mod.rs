//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: membership store wiring and startup bootstrap
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and parameter parsing
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use talentdesk_infra::MembershipStore;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(jwt_secret: String, store: Arc<dyn MembershipStore>) -> Router {
    let jwt = Arc::new(talentdesk_auth::Hs256JwtValidator::new(jwt_secret.into_bytes()));
    let auth_state = middleware::AuthState { jwt };

    let services = Arc::new(services::AppServices::new(store));

    // Protected routes: require a valid bearer token.
    let protected = routes::router().layer(
        ServiceBuilder::new()
            .layer(Extension(services))
            .layer(axum::middleware::from_fn_with_state(auth_state, middleware::auth_middleware)),
    );

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
}
