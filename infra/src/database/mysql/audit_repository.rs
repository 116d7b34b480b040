//! MySQL implementation of the AuditLogRepository trait.
//!
//! Entries are appended to `cts_audit_log` and never updated.

use async_trait::async_trait;
use sqlx::MySqlPool;

use cts_core::domain::entities::audit::AuditLog;
use cts_core::errors::DomainError;
use cts_core::repositories::audit::AuditLogRepository;

use crate::InfrastructureError;

/// MySQL implementation of AuditLogRepository
#[derive(Clone)]
pub struct MySqlAuditLogRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlAuditLogRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogRepository for MySqlAuditLogRepository {
    async fn create(&self, audit_log: &AuditLog) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO cts_audit_log (
                id, event_type, token_id, client_id, owner_id, realm,
                tracking_id, event_data, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        let event_data = audit_log
            .event_data
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(InfrastructureError::from)?;

        sqlx::query(query)
            .bind(audit_log.id.to_string())
            .bind(audit_log.event_type.as_str())
            .bind(&audit_log.token_id)
            .bind(&audit_log.client_id)
            .bind(&audit_log.owner_id)
            .bind(&audit_log.realm)
            .bind(&audit_log.tracking_id)
            .bind(event_data)
            .bind(audit_log.created_at)
            .execute(&self.pool)
            .await
            .map_err(InfrastructureError::Database)?;

        Ok(())
    }
}
