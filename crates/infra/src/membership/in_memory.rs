use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use talentdesk_auth::{Membership, PrincipalId};
use talentdesk_core::MembershipId;

use super::store::{MembershipStore, NewMembership, StoreError};

/// In-memory membership store for tests/dev.
///
/// Records are kept in grant order. [`InMemoryMembershipStore::set_available`]
/// simulates an outage.
#[derive(Debug)]
pub struct InMemoryMembershipStore {
    inner: RwLock<Vec<Membership>>,
    available: AtomicBool,
}

impl InMemoryMembershipStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    pub fn with_memberships(memberships: impl IntoIterator<Item = Membership>) -> Self {
        let store = Self::new();
        if let Ok(mut v) = store.inner.write() {
            v.extend(memberships);
        }
        store
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store marked unavailable".to_string()))
        }
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("membership lock poisoned".to_string())
    }
}

impl Default for InMemoryMembershipStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MembershipStore for InMemoryMembershipStore {
    async fn list_for_principal(&self, principal_id: PrincipalId) -> Result<Vec<Membership>, StoreError> {
        self.check_available()?;
        let v = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(v.iter().filter(|m| m.principal_id == principal_id).cloned().collect())
    }

    async fn get(&self, id: MembershipId) -> Result<Option<Membership>, StoreError> {
        self.check_available()?;
        let v = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(v.iter().find(|m| m.id == id).cloned())
    }

    async fn grant(&self, new: NewMembership) -> Result<Membership, StoreError> {
        self.check_available()?;
        let mut v = self.inner.write().map_err(|_| Self::poisoned())?;

        if let Some(existing) = v.iter().find(|m| new.matches(m)) {
            return Ok(existing.clone());
        }

        let membership = Membership {
            id: MembershipId::new(),
            principal_id: new.principal_id,
            role: new.role,
            scope: new.scope,
            granted_at: Utc::now(),
        };
        v.push(membership.clone());
        Ok(membership)
    }

    async fn revoke(&self, id: MembershipId) -> Result<Option<Membership>, StoreError> {
        self.check_available()?;
        let mut v = self.inner.write().map_err(|_| Self::poisoned())?;
        let idx = v.iter().position(|m| m.id == id);
        Ok(idx.map(|i| v.remove(i)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use talentdesk_auth::Role;
    use talentdesk_core::ScopeId;

    fn grant(p: PrincipalId, role: Role, scope: Option<&str>) -> NewMembership {
        NewMembership {
            principal_id: p,
            role,
            scope: scope.map(|s| ScopeId::new(s).unwrap()),
        }
    }

    #[tokio::test]
    async fn grant_list_revoke() {
        let store = InMemoryMembershipStore::new();
        let alice = PrincipalId::new();
        let bob = PrincipalId::new();

        let a1 = store.grant(grant(alice, Role::Editor, Some("talent-1"))).await.unwrap();
        store.grant(grant(alice, Role::Viewer, None)).await.unwrap();
        store.grant(grant(bob, Role::Owner, None)).await.unwrap();

        let listed = store.list_for_principal(alice).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|m| m.principal_id == alice));
        assert_eq!(listed[0].id, a1.id);

        assert_eq!(store.get(a1.id).await.unwrap(), Some(a1.clone()));
        assert_eq!(store.revoke(a1.id).await.unwrap(), Some(a1.clone()));
        assert_eq!(store.revoke(a1.id).await.unwrap(), None);
        assert_eq!(store.list_for_principal(alice).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn identical_grant_is_idempotent() {
        let store = InMemoryMembershipStore::new();
        let p = PrincipalId::new();

        let first = store.grant(grant(p, Role::Manager, Some("talent-9"))).await.unwrap();
        let second = store.grant(grant(p, Role::Manager, Some("talent-9"))).await.unwrap();
        assert_eq!(first.id, second.id);

        // Same role, different scope is a different grant.
        let third = store.grant(grant(p, Role::Manager, None)).await.unwrap();
        assert_ne!(first.id, third.id);
    }

    #[tokio::test]
    async fn unavailable_store_errors() {
        let store = InMemoryMembershipStore::new();
        store.set_available(false);

        let err = store.list_for_principal(PrincipalId::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        store.set_available(true);
        assert!(store.list_for_principal(PrincipalId::new()).await.unwrap().is_empty());
    }
}
