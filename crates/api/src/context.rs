use talentdesk_auth::PrincipalId;

/// Principal context for a request (authenticated identity).
///
/// Carries no roles: roles are resolved from memberships per request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal_id: PrincipalId,
}

impl PrincipalContext {
    pub fn new(principal_id: PrincipalId) -> Self {
        Self { principal_id }
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }
}
