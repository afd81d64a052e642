use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use talentdesk_auth::{Membership, PrincipalId, Role};
use talentdesk_core::{MembershipId, ScopeId};

/// Store-level failures.
///
/// None of these reach the resolver: [`crate::MembershipLookup`] turns them
/// into the fallback role.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached (connection, pool, timeout).
    #[error("membership store unavailable: {0}")]
    Unavailable(String),

    /// The backing table does not exist.
    #[error("membership schema missing: {0}")]
    SchemaMissing(String),

    /// A stored record could not be decoded (e.g. unknown role tag).
    #[error("corrupt membership record: {0}")]
    Corrupt(String),
}

/// Request to grant a role to a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMembership {
    pub principal_id: PrincipalId,
    pub role: Role,
    /// `None` grants the role organization-wide.
    pub scope: Option<ScopeId>,
}

impl NewMembership {
    pub fn matches(&self, m: &Membership) -> bool {
        m.principal_id == self.principal_id && m.role == self.role && m.scope == self.scope
    }
}

/// Source of membership records (external collaborator).
///
/// Implementations only store and fetch; they never decide access.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Every membership held by `principal_id`, in grant order.
    async fn list_for_principal(&self, principal_id: PrincipalId) -> Result<Vec<Membership>, StoreError>;

    async fn get(&self, id: MembershipId) -> Result<Option<Membership>, StoreError>;

    /// Grant a role. Granting an identical (principal, role, scope) again
    /// returns the existing record.
    async fn grant(&self, new: NewMembership) -> Result<Membership, StoreError>;

    /// Remove a membership, returning it if it existed.
    async fn revoke(&self, id: MembershipId) -> Result<Option<Membership>, StoreError>;
}

#[async_trait]
impl<S> MembershipStore for Arc<S>
where
    S: MembershipStore + ?Sized,
{
    async fn list_for_principal(&self, principal_id: PrincipalId) -> Result<Vec<Membership>, StoreError> {
        (**self).list_for_principal(principal_id).await
    }

    async fn get(&self, id: MembershipId) -> Result<Option<Membership>, StoreError> {
        (**self).get(id).await
    }

    async fn grant(&self, new: NewMembership) -> Result<Membership, StoreError> {
        (**self).grant(new).await
    }

    async fn revoke(&self, id: MembershipId) -> Result<Option<Membership>, StoreError> {
        (**self).revoke(id).await
    }
}
