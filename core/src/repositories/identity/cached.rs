//! Identity manager decorator keeping an injected cache in step with its inner manager.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use super::r#trait::{IdentityCache, IdentityManager};
use crate::domain::entities::identity::Identity;
use crate::domain::entities::token::OwnerRef;
use crate::errors::{DomainError, DomainResult, OAuth2Error};

/// Mirrors active identities of an inner identity manager into a cache
///
/// Owner status is always confirmed with the inner manager; a cached entry
/// never answers a lookup on its own. Active identities are written to the
/// cache when they differ from the cached copy, and the entry is dropped as
/// soon as the inner manager reports the owner missing, inactive or
/// unauthorized. Cache failures never fail a lookup.
pub struct CachedIdentityManager {
    inner: Arc<dyn IdentityManager>,
    cache: Arc<dyn IdentityCache>,
}

impl CachedIdentityManager {
    pub fn new(inner: Arc<dyn IdentityManager>, cache: Arc<dyn IdentityCache>) -> Self {
        Self { inner, cache }
    }

    async fn cached(&self, owner: &OwnerRef) -> Option<Identity> {
        match self.cache.get(owner).await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(owner = %owner, error = %e, "Identity cache read failed");
                None
            }
        }
    }

    async fn drop_entry(&self, owner: &OwnerRef) {
        debug!(owner = %owner, "Owner no longer valid, dropping cached identity");
        if let Err(e) = self.cache.invalidate(owner).await {
            warn!(owner = %owner, error = %e, "Identity cache invalidation failed");
        }
    }
}

#[async_trait]
impl IdentityManager for CachedIdentityManager {
    async fn get_resource_owner_identity(
        &self,
        owner_id: &str,
        realm: &str,
    ) -> DomainResult<Option<Identity>> {
        let owner = OwnerRef::new(owner_id, realm);
        let cached = self.cached(&owner).await;

        let resolved = self.inner.get_resource_owner_identity(owner_id, realm).await;

        match &resolved {
            Ok(Some(identity)) if identity.active => {
                if cached.as_ref() != Some(identity) {
                    if let Err(e) = self.cache.put(identity).await {
                        warn!(owner = %owner, error = %e, "Identity cache write failed");
                    }
                }
            }
            Ok(_) | Err(DomainError::OAuth2(OAuth2Error::UnauthorizedClient { .. })) => {
                if cached.is_some() {
                    self.drop_entry(&owner).await;
                }
            }
            Err(_) => {}
        }

        resolved
    }
}
