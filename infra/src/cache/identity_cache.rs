//! Redis-backed identity cache.
//!
//! Identities are stored as JSON under `<prefix>:identity:<realm>:<id>` with
//! `SET EX`, so an expired entry is simply absent on read.

use async_trait::async_trait;
use tracing::warn;

use cts_core::domain::entities::identity::Identity;
use cts_core::domain::entities::token::OwnerRef;
use cts_core::errors::{DomainError, DomainResult};
use cts_core::repositories::identity::IdentityCache;
use cts_shared::CacheConfig;

use super::redis_client::RedisClient;
use crate::InfrastructureError;

/// Identity cache over Redis
#[derive(Clone)]
pub struct RedisIdentityCache {
    client: RedisClient,
    ttl_seconds: u64,
}

impl RedisIdentityCache {
    /// Cache entries live for the client's configured default TTL
    pub fn new(client: RedisClient) -> Self {
        let ttl_seconds = client.config().default_ttl;
        Self::with_ttl(client, ttl_seconds)
    }

    pub fn with_ttl(client: RedisClient, ttl_seconds: u64) -> Self {
        Self {
            client,
            ttl_seconds: ttl_seconds.max(1),
        }
    }

    /// Cache key of an owner
    pub fn identity_key(config: &CacheConfig, owner: &OwnerRef) -> String {
        config.make_key(&format!("identity:{}:{}", owner.realm, owner.id))
    }

    fn key(&self, owner: &OwnerRef) -> String {
        Self::identity_key(self.client.config(), owner)
    }
}

#[async_trait]
impl IdentityCache for RedisIdentityCache {
    async fn get(&self, owner: &OwnerRef) -> DomainResult<Option<Identity>> {
        let key = self.key(owner);
        let Some(value) = self.client.get(&key).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<Identity>(&value) {
            Ok(identity) => Ok(Some(identity)),
            Err(e) => {
                warn!(key = %key, error = %e, "Dropping undecodable identity cache entry");
                self.client.delete(&key).await?;
                Ok(None)
            }
        }
    }

    async fn put(&self, identity: &Identity) -> DomainResult<()> {
        let value = serde_json::to_string(identity)
            .map_err(|e| DomainError::from(InfrastructureError::from(e)))?;
        self.client
            .set_with_expiry(&self.key(&identity.owner_ref()), &value, self.ttl_seconds)
            .await?;
        Ok(())
    }

    async fn invalidate(&self, owner: &OwnerRef) -> DomainResult<()> {
        self.client.delete(&self.key(owner)).await?;
        Ok(())
    }
}
