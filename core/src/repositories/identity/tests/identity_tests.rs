//! Unit tests for identity lookup and caching

use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{Identity, OwnerRef};
use crate::errors::{DomainError, OAuth2Error};
use crate::repositories::identity::{
    CachedIdentityManager, IdentityCache, IdentityManager, InMemoryIdentityManager, TtlCache,
};

#[tokio::test]
async fn test_inactive_and_unknown_owners_resolve_to_none() {
    let manager = InMemoryIdentityManager::new();
    manager.add(Identity::active("alice", "/")).await;
    manager.add(Identity::inactive("bob", "/")).await;

    assert!(manager.get_resource_owner_identity("alice", "/").await.unwrap().is_some());
    assert!(manager.get_resource_owner_identity("bob", "/").await.unwrap().is_none());
    assert!(manager.get_resource_owner_identity("carol", "/").await.unwrap().is_none());
    assert!(manager.get_resource_owner_identity("alice", "/other").await.unwrap().is_none());
}

#[tokio::test]
async fn test_denied_owner_fails_with_unauthorized_client() {
    let manager = InMemoryIdentityManager::new();
    manager.add(Identity::active("alice", "/")).await;
    manager.deny(OwnerRef::new("alice", "/")).await;

    let err = manager.get_resource_owner_identity("alice", "/").await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::OAuth2(OAuth2Error::UnauthorizedClient { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_ttl_cache_expires_on_read() {
    let cache = TtlCache::new(Duration::from_secs(30), 10);
    let identity = Identity::active("alice", "/");
    cache.put(&identity).await.unwrap();

    assert_eq!(cache.get(&identity.owner_ref()).await.unwrap(), Some(identity.clone()));

    tokio::time::advance(Duration::from_secs(31)).await;
    assert!(cache.get(&identity.owner_ref()).await.unwrap().is_none());
    assert!(cache.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn test_ttl_cache_is_bounded() {
    let cache = TtlCache::new(Duration::from_secs(30), 2);
    cache.put(&Identity::active("a", "/")).await.unwrap();
    tokio::time::advance(Duration::from_secs(1)).await;
    cache.put(&Identity::active("b", "/")).await.unwrap();
    tokio::time::advance(Duration::from_secs(1)).await;
    cache.put(&Identity::active("c", "/")).await.unwrap();

    assert_eq!(cache.len().await, 2);
    assert!(cache.get(&OwnerRef::new("a", "/")).await.unwrap().is_none());
    assert!(cache.get(&OwnerRef::new("c", "/")).await.unwrap().is_some());
}

#[tokio::test]
async fn test_cached_manager_confirms_every_lookup_with_inner() {
    let inner = Arc::new(InMemoryIdentityManager::new());
    inner.add(Identity::active("alice", "/")).await;
    let cache = Arc::new(TtlCache::new(Duration::from_secs(60), 10));
    let manager = CachedIdentityManager::new(inner.clone(), cache.clone());
    let owner = OwnerRef::new("alice", "/");

    assert!(manager.get_resource_owner_identity("alice", "/").await.unwrap().is_some());
    assert!(manager.get_resource_owner_identity("alice", "/").await.unwrap().is_some());
    assert_eq!(inner.lookups(), 2);
    assert_eq!(cache.get(&owner).await.unwrap(), Some(Identity::active("alice", "/")));

    inner.deactivate(&owner).await;
    assert!(manager.get_resource_owner_identity("alice", "/").await.unwrap().is_none());
    assert!(cache.get(&owner).await.unwrap().is_none());
}

#[tokio::test]
async fn test_cached_manager_drops_denied_owner() {
    let inner = Arc::new(InMemoryIdentityManager::new());
    inner.add(Identity::active("alice", "/")).await;
    let cache = Arc::new(TtlCache::new(Duration::from_secs(60), 10));
    let manager = CachedIdentityManager::new(inner.clone(), cache.clone());

    manager.get_resource_owner_identity("alice", "/").await.unwrap();
    inner.deny(OwnerRef::new("alice", "/")).await;

    let err = manager.get_resource_owner_identity("alice", "/").await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::OAuth2(OAuth2Error::UnauthorizedClient { .. })
    ));
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_cached_manager_does_not_cache_missing_owners() {
    let inner = Arc::new(InMemoryIdentityManager::new());
    let cache = Arc::new(TtlCache::new(Duration::from_secs(60), 10));
    let manager = CachedIdentityManager::new(inner.clone(), cache.clone());

    assert!(manager.get_resource_owner_identity("ghost", "/").await.unwrap().is_none());
    assert!(manager.get_resource_owner_identity("ghost", "/").await.unwrap().is_none());
    assert_eq!(inner.lookups(), 2);
    assert!(cache.is_empty().await);
}
