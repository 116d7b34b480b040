//! Identity manager and identity cache contracts.

use async_trait::async_trait;

use crate::domain::entities::identity::Identity;
use crate::domain::entities::token::OwnerRef;
use crate::errors::DomainResult;

/// Resolves resource owners referenced by tokens
#[async_trait]
pub trait IdentityManager: Send + Sync {
    /// Resolve the owner `owner_id` in `realm`
    ///
    /// # Returns
    /// * `Ok(Some(Identity))` - The owner exists and is active
    /// * `Ok(None)` - The owner does not exist or is no longer active
    /// * `Err(OAuth2Error::UnauthorizedClient)` - The identity cannot be authorized
    async fn get_resource_owner_identity(
        &self,
        owner_id: &str,
        realm: &str,
    ) -> DomainResult<Option<Identity>>;
}

/// Bounded identity cache with expiry checked on read
#[async_trait]
pub trait IdentityCache: Send + Sync {
    /// Cached identity, or `None` when absent or expired
    async fn get(&self, owner: &OwnerRef) -> DomainResult<Option<Identity>>;

    async fn put(&self, identity: &Identity) -> DomainResult<()>;

    async fn invalidate(&self, owner: &OwnerRef) -> DomainResult<()>;
}
