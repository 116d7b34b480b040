//! Unit tests for the reaper scheduler

use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::domain::entities::{PartialToken, TokenType};
use crate::repositories::{InMemoryAuditLogRepository, InMemoryTokenStore};
use crate::services::audit::{AuditService, AuditServiceConfig};
use crate::services::reaper::{
    spawn_reaper_task, BatchReaper, ExpiryProcessKind, SessionExpiryProcess,
};

#[tokio::test(start_paused = true)]
async fn test_reaper_task_runs_after_first_interval() {
    let store = Arc::new(InMemoryTokenStore::new());
    store
        .insert_partial(PartialToken::new(
            "expired",
            TokenType::RefreshToken,
            Utc::now() - ChronoDuration::minutes(1),
        ))
        .await;

    let audit = Arc::new(AuditService::new(
        Arc::new(InMemoryAuditLogRepository::new()),
        AuditServiceConfig { async_writes: false },
    ));
    let process = Arc::new(SessionExpiryProcess::new(
        ExpiryProcessKind::Reaper,
        store.clone(),
        audit,
        Arc::new(Semaphore::new(2)),
        Duration::from_secs(5),
    ));
    let reaper = Arc::new(BatchReaper::new(store.clone(), process, 100));

    let handle = spawn_reaper_task(reaper, Duration::from_secs(60));

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(store.contains("expired").await);
    assert_eq!(store.queries_opened(), 0);

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert!(!store.contains("expired").await);
    assert_eq!(store.queries_opened(), 1);

    handle.abort();
}
