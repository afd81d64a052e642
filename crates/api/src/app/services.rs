use std::sync::Arc;

use talentdesk_auth::{Membership, PrincipalId, Role};
use talentdesk_infra::{
    InMemoryMembershipStore, MembershipLookup, MembershipStore, NewMembership, PostgresMembershipStore,
    StoreError,
};

use crate::config::ApiConfig;

/// Shared handler dependencies.
#[derive(Clone, Debug)]
pub struct AppServices {
    pub lookup: MembershipLookup,
}

impl AppServices {
    pub fn new(store: Arc<dyn MembershipStore>) -> Self {
        Self { lookup: MembershipLookup::new(store) }
    }

    pub fn store(&self) -> &dyn MembershipStore {
        self.lookup.store().as_ref()
    }
}

/// Pick the membership store from configuration.
///
/// A Postgres store connects lazily; if the schema cannot be ensured at
/// startup the process still comes up and lookups resolve to the fallback
/// role until the database is reachable.
pub async fn build_store(config: &ApiConfig) -> Result<Arc<dyn MembershipStore>, StoreError> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set; using in-memory membership store");
        return Ok(Arc::new(InMemoryMembershipStore::new()));
    };

    let store =
        PostgresMembershipStore::connect_lazy(url, config.db_max_connections, config.db_acquire_timeout)?;
    if let Err(e) = store.ensure_schema().await {
        tracing::warn!(error = %e, "could not ensure membership schema at startup");
    }
    Ok(Arc::new(store))
}

/// Grant `principal_id` an org-wide `owner` membership (idempotent).
pub async fn bootstrap_owner(
    store: &dyn MembershipStore,
    principal_id: PrincipalId,
) -> Result<Membership, StoreError> {
    let membership = store
        .grant(NewMembership { principal_id, role: Role::Owner, scope: None })
        .await?;
    tracing::info!(%principal_id, membership_id = %membership.id, "bootstrap owner ensured");
    Ok(membership)
}
