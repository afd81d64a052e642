//! Boundary between the membership store and the pure resolver.
//!
//! Store failures stop here. Callers always get an [`AccessGate`]; when the
//! store cannot be read it is an "unavailable" gate that resolves every scope
//! to the fallback role.

use std::sync::Arc;

use tracing::instrument;

use talentdesk_auth::{AccessGate, PrincipalId, Resolution, Scope};

use super::store::{MembershipStore, StoreError};

#[derive(Clone)]
pub struct MembershipLookup {
    store: Arc<dyn MembershipStore>,
}

impl MembershipLookup {
    pub fn new(store: Arc<dyn MembershipStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn MembershipStore> {
        &self.store
    }

    /// Take a fresh membership snapshot for `principal_id`.
    #[instrument(skip(self), fields(principal_id = %principal_id))]
    pub async fn gate_for(&self, principal_id: PrincipalId) -> AccessGate {
        match self.store.list_for_principal(principal_id).await {
            Ok(memberships) => AccessGate::new(principal_id, memberships),
            Err(err) => {
                log_lookup_failure(&err);
                AccessGate::unavailable(principal_id)
            }
        }
    }

    pub async fn resolve_for(&self, principal_id: PrincipalId, scope: &Scope) -> Resolution {
        self.gate_for(principal_id).await.resolve(scope)
    }
}

impl core::fmt::Debug for MembershipLookup {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MembershipLookup").finish_non_exhaustive()
    }
}

fn log_lookup_failure(err: &StoreError) {
    match err {
        StoreError::SchemaMissing(_) => {
            tracing::error!(error = %err, "membership table missing; resolving to fallback role")
        }
        StoreError::Unavailable(_) | StoreError::Corrupt(_) => {
            tracing::warn!(error = %err, "membership lookup failed; resolving to fallback role")
        }
    }
}
