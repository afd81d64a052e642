use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use talentdesk_auth::AuthzError;
use talentdesk_core::DomainError;
use talentdesk_infra::StoreError;

pub fn authz_error_to_response(err: AuthzError) -> axum::response::Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    tracing::error!(error = %err, "membership store error");
    let code = match err {
        StoreError::Unavailable(_) => "store_unavailable",
        StoreError::SchemaMissing(_) => "schema_missing",
        StoreError::Corrupt(_) => "store_corrupt",
    };
    json_error(StatusCode::SERVICE_UNAVAILABLE, code, "membership store unavailable")
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
