//! Bounded in-process identity cache.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::r#trait::IdentityCache;
use crate::domain::entities::identity::Identity;
use crate::domain::entities::token::OwnerRef;
use crate::errors::DomainResult;

struct CacheEntry {
    identity: Identity,
    expires_at: Instant,
}

/// Identity cache holding at most `capacity` entries for `ttl` each
///
/// Expiry is checked on read. When full, expired entries are purged first
/// and then the entry closest to expiry is evicted.
pub struct TtlCache {
    entries: Mutex<HashMap<OwnerRef, CacheEntry>>,
    ttl: Duration,
    capacity: usize,
}

impl TtlCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl IdentityCache for TtlCache {
    async fn get(&self, owner: &OwnerRef) -> DomainResult<Option<Identity>> {
        let mut entries = self.entries.lock().await;
        match entries.get(owner) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.identity.clone())),
            Some(_) => {
                entries.remove(owner);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, identity: &Identity) -> DomainResult<()> {
        let now = Instant::now();
        let owner = identity.owner_ref();
        let mut entries = self.entries.lock().await;

        if !entries.contains_key(&owner) && entries.len() >= self.capacity {
            entries.retain(|_, entry| entry.expires_at > now);
            if entries.len() >= self.capacity {
                let soonest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.expires_at)
                    .map(|(key, _)| key.clone());
                if let Some(key) = soonest {
                    entries.remove(&key);
                }
            }
        }

        entries.insert(
            owner,
            CacheEntry {
                identity: identity.clone(),
                expires_at: now + self.ttl,
            },
        );
        Ok(())
    }

    async fn invalidate(&self, owner: &OwnerRef) -> DomainResult<()> {
        self.entries.lock().await.remove(owner);
        Ok(())
    }
}
