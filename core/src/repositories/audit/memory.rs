//! In-memory implementation of AuditLogRepository for tests and local runs.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::AuditLogRepository;
use crate::domain::entities::audit::{AuditEventType, AuditLog};
use crate::errors::DomainError;

/// Audit repository keeping entries in memory
#[derive(Clone, Default)]
pub struct InMemoryAuditLogRepository {
    logs: Arc<RwLock<Vec<AuditLog>>>,
    should_fail: Arc<AtomicBool>,
}

impl InMemoryAuditLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether writes should fail
    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// All stored entries, oldest first
    pub async fn entries(&self) -> Vec<AuditLog> {
        self.logs.read().await.clone()
    }

    /// Stored entries of one event type
    pub async fn entries_of(&self, event_type: AuditEventType) -> Vec<AuditLog> {
        self.logs
            .read()
            .await
            .iter()
            .filter(|log| log.event_type == event_type)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AuditLogRepository for InMemoryAuditLogRepository {
    async fn create(&self, audit_log: &AuditLog) -> Result<(), DomainError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::internal("audit log store rejected the write"));
        }
        self.logs.write().await.push(audit_log.clone());
        Ok(())
    }
}
