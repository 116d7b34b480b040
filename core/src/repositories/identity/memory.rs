//! In-memory identity manager.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::r#trait::IdentityManager;
use crate::domain::entities::identity::Identity;
use crate::domain::entities::token::OwnerRef;
use crate::errors::{DomainResult, OAuth2Error};

/// Identity manager backed by an in-memory owner table
#[derive(Clone, Default)]
pub struct InMemoryIdentityManager {
    identities: Arc<RwLock<HashMap<OwnerRef, Identity>>>,
    denied: Arc<RwLock<HashSet<OwnerRef>>>,
    lookups: Arc<AtomicUsize>,
}

impl InMemoryIdentityManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, identity: Identity) {
        self.identities
            .write()
            .await
            .insert(identity.owner_ref(), identity);
    }

    /// Mark an owner inactive; lookups then resolve to `None`
    pub async fn deactivate(&self, owner: &OwnerRef) {
        if let Some(identity) = self.identities.write().await.get_mut(owner) {
            identity.active = false;
        }
    }

    /// Make lookups of an owner fail the authorization check
    pub async fn deny(&self, owner: OwnerRef) {
        self.denied.write().await.insert(owner);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityManager for InMemoryIdentityManager {
    async fn get_resource_owner_identity(
        &self,
        owner_id: &str,
        realm: &str,
    ) -> DomainResult<Option<Identity>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let owner = OwnerRef::new(owner_id, realm);

        if self.denied.read().await.contains(&owner) {
            return Err(OAuth2Error::unauthorized_client(format!(
                "identity {} cannot be authorized",
                owner
            ))
            .into());
        }

        Ok(self
            .identities
            .read()
            .await
            .get(&owner)
            .filter(|identity| identity.active)
            .cloned())
    }
}
