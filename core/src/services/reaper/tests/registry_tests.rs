//! Unit tests for the process registry

use chrono::{Duration, Utc};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use cts_shared::ReaperConfig;

use crate::domain::entities::partial_token::PartialToken;
use crate::domain::entities::token::TokenType;
use crate::errors::{CoreTokenError, DomainError};
use crate::repositories::{InMemoryAuditLogRepository, InMemoryTokenStore, ReaperFilter};
use crate::services::audit::{AuditService, AuditServiceConfig};
use crate::services::reaper::{BatchReaper, ProcessDependencies, ProcessRegistry};

fn deps() -> ProcessDependencies {
    let audit = AuditService::new(
        Arc::new(InMemoryAuditLogRepository::new()),
        AuditServiceConfig { async_writes: false },
    );
    ProcessDependencies::new(
        Arc::new(InMemoryTokenStore::new()),
        Arc::new(audit),
        &ReaperConfig::default(),
    )
}

#[test]
fn test_default_registry_keys() {
    let registry = ProcessRegistry::with_defaults();
    let keys: Vec<&str> = registry.keys().collect();
    assert_eq!(keys, vec!["idle-timeout", "max-session-time", "reaper"]);
}

#[tokio::test]
async fn test_resolve_builds_processes_in_configured_order() {
    let registry = ProcessRegistry::with_defaults();
    let processes = registry
        .resolve(&ReaperConfig::default().processes, &deps())
        .unwrap();

    let names: Vec<&str> = processes.iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["reaper", "max-session-time", "idle-timeout"]);
    assert_eq!(processes[0].filter(), ReaperFilter::ExpiredTokens);
    assert_eq!(processes[2].filter(), ReaperFilter::IdleTimeoutExpired);
}

#[tokio::test]
async fn test_unknown_key_fails_eagerly() {
    let registry = ProcessRegistry::with_defaults();
    let keys = vec!["reaper".to_string(), "session-reaper".to_string()];

    match registry.resolve(&keys, &deps()) {
        Err(DomainError::CoreToken(CoreTokenError::UnknownProcess { key })) => {
            assert_eq!(key, "session-reaper");
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("unknown key should not resolve"),
    }
}

#[tokio::test]
async fn test_resolved_processes_draw_from_the_shared_pool() {
    let store = Arc::new(InMemoryTokenStore::new());
    store
        .insert_partial(PartialToken::new(
            "access-expired",
            TokenType::AccessToken,
            Utc::now() - Duration::minutes(1),
        ))
        .await;

    let audit = AuditService::new(
        Arc::new(InMemoryAuditLogRepository::new()),
        AuditServiceConfig { async_writes: false },
    );
    let config = ReaperConfig::default().with_worker_pool_size(1);
    let deps = ProcessDependencies::new(store.clone(), Arc::new(audit), &config);
    let processes = ProcessRegistry::with_defaults()
        .resolve(&config.processes, &deps)
        .unwrap();
    let reaper = BatchReaper::new(store.clone(), processes[0].clone(), config.page_size);

    // Holding the only worker keeps every resolved process from deleting
    let permit = deps.workers.clone().acquire_owned().await.unwrap();
    let blocked = tokio::time::timeout(StdDuration::from_millis(50), reaper.run()).await;
    assert!(blocked.is_err());
    assert!(store.contains("access-expired").await);

    drop(permit);
    tokio::time::sleep(StdDuration::from_millis(50)).await;
    assert!(!store.contains("access-expired").await);
    assert_eq!(deps.workers.available_permits(), 1);
}
