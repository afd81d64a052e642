//! Request DTOs and parameter parsing.
//!
//! Roles, permissions and scope ids arrive as plain strings so that an
//! unknown name is a 400 with a useful message rather than an extractor
//! rejection.

use axum::http::StatusCode;
use serde::Deserialize;

use talentdesk_auth::{Permission, PrincipalId, Role, Scope};
use talentdesk_core::ScopeId;

use crate::app::errors::{domain_error_to_response, json_error};

#[derive(Debug, Deserialize)]
pub struct EffectiveRoleQuery {
    pub talent_id: Option<String>,
    /// Another principal to resolve for; defaults to the caller.
    pub principal_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExplainQuery {
    pub permission: Option<String>,
    pub role: Option<String>,
    pub talent_id: Option<String>,
    pub principal_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MembershipsQuery {
    pub principal_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GrantMembershipRequest {
    pub principal_id: String,
    pub role: String,
    /// Absent or null: organization-wide.
    #[serde(default)]
    pub talent_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub principal_id: String,
    pub role: String,
    /// Empty: a single organization-wide grant.
    #[serde(default)]
    pub talent_ids: Vec<String>,
}

pub fn parse_principal_id(s: &str) -> Result<PrincipalId, axum::response::Response> {
    s.parse()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid principal id"))
}

/// Target of an inspection endpoint: `principal_id` when given, the caller
/// otherwise.
pub fn parse_target(
    principal_id: Option<&str>,
    caller: PrincipalId,
) -> Result<PrincipalId, axum::response::Response> {
    match principal_id {
        None | Some("") => Ok(caller),
        Some(id) => parse_principal_id(id),
    }
}

pub fn parse_role(s: &str) -> Result<Role, axum::response::Response> {
    s.parse()
        .map_err(|e: talentdesk_auth::ParseRoleError| json_error(StatusCode::BAD_REQUEST, "invalid_role", e.to_string()))
}

pub fn parse_permission(s: &str) -> Result<Permission, axum::response::Response> {
    s.parse().map_err(|e: talentdesk_auth::ParsePermissionError| {
        json_error(StatusCode::BAD_REQUEST, "invalid_permission", e.to_string())
    })
}

pub fn parse_scope_id(s: &str) -> Result<ScopeId, axum::response::Response> {
    ScopeId::new(s).map_err(domain_error_to_response)
}

/// `None` and an empty value (`?talent_id=`) are organization-wide.
pub fn parse_scope(talent_id: Option<&str>) -> Result<Scope, axum::response::Response> {
    match talent_id {
        None | Some("") => Ok(Scope::Organization),
        Some(id) => parse_scope_id(id).map(Scope::Talent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_parsing() {
        assert_eq!(parse_scope(None).unwrap(), Scope::Organization);
        assert_eq!(
            parse_scope(Some("talent-7")).unwrap(),
            Scope::Talent(ScopeId::new("talent-7").unwrap())
        );
        assert_eq!(parse_scope(Some("")).unwrap(), Scope::Organization);
        assert_eq!(parse_scope(Some(" ")).unwrap_err().status(), StatusCode::BAD_REQUEST);
        assert_eq!(parse_scope(Some(" talent-7")).unwrap_err().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn target_defaults_to_the_caller() {
        let caller = PrincipalId::new();
        let other = PrincipalId::new();
        assert_eq!(parse_target(None, caller).unwrap(), caller);
        assert_eq!(parse_target(Some(""), caller).unwrap(), caller);
        assert_eq!(parse_target(Some(&other.to_string()), caller).unwrap(), other);
        assert_eq!(parse_target(Some("nope"), caller).unwrap_err().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unknown_names_are_bad_requests() {
        assert_eq!(parse_role("superuser").unwrap_err().status(), StatusCode::BAD_REQUEST);
        assert_eq!(parse_permission("fly").unwrap_err().status(), StatusCode::BAD_REQUEST);
        assert_eq!(parse_role("admin").unwrap(), Role::Admin);
        assert_eq!(parse_permission("view_tasks").unwrap(), Permission::ViewTasks);
    }

    #[test]
    fn invite_talent_ids_default_to_empty() {
        let req: InviteRequest =
            serde_json::from_str(r#"{"principal_id":"x","role":"viewer"}"#).unwrap();
        assert!(req.talent_ids.is_empty());
    }
}
