//! Audit service for session terminations and refresh token exchanges.
//!
//! Audit writes never fail the operation being audited: a failed write is
//! logged and dropped.

use std::sync::Arc;
use tokio::task;
use tracing::warn;

use crate::domain::entities::audit::{AuditEventType, AuditLog};
use crate::domain::entities::partial_token::{ExpiryReason, PartialToken};
use crate::domain::entities::token::{AccessToken, RefreshToken};
use crate::repositories::AuditLogRepository;

/// Configuration for the audit service
#[derive(Debug, Clone)]
pub struct AuditServiceConfig {
    /// Whether to run audit writes on a background task
    pub async_writes: bool,
}

impl Default for AuditServiceConfig {
    fn default() -> Self {
        Self { async_writes: true }
    }
}

/// Best-effort writer of audit log entries
pub struct AuditService {
    repository: Arc<dyn AuditLogRepository>,
    config: AuditServiceConfig,
}

impl AuditService {
    pub fn new(repository: Arc<dyn AuditLogRepository>, config: AuditServiceConfig) -> Self {
        Self { repository, config }
    }

    /// Audit the termination of an expired session
    pub async fn log_session_terminated(&self, session: &PartialToken, reason: ExpiryReason) {
        let event_type = match reason {
            ExpiryReason::MaxSessionTime => AuditEventType::SessionMaxTimedOut,
            ExpiryReason::IdleTimeout => AuditEventType::SessionIdleTimedOut,
            ExpiryReason::Ttl => AuditEventType::SessionExpired,
        };
        let log = AuditLog::new(event_type)
            .with_token(session.id.clone())
            .with_event_data(serde_json::json!({
                "reason": reason.as_str(),
                "expires_at": session.expires_at,
            }));
        self.write_log(log).await;
    }

    /// Audit a successful refresh exchange
    pub async fn log_refresh_success(
        &self,
        previous: &RefreshToken,
        access_token: &AccessToken,
        rotated_to: Option<&str>,
    ) {
        let event_type = if rotated_to.is_some() {
            AuditEventType::RefreshTokenRotated
        } else {
            AuditEventType::RefreshTokenSuccess
        };
        let log = AuditLog::new(event_type)
            .with_token(previous.id.clone())
            .with_client(previous.client_id.clone())
            .with_owner(&previous.owner)
            .with_tracking_id(previous.audit_tracking_id.clone())
            .with_event_data(serde_json::json!({
                "access_token_tracking_id": access_token.audit_tracking_id,
                "rotated_to": rotated_to,
                "scope": access_token.scope_string(),
            }));
        self.write_log(log).await;
    }

    /// Audit a refresh exchange rejected after the token was found
    pub async fn log_refresh_failure(&self, token: &RefreshToken, error_code: &str) {
        let log = AuditLog::new(AuditEventType::RefreshTokenFailure)
            .with_token(token.id.clone())
            .with_client(token.client_id.clone())
            .with_owner(&token.owner)
            .with_tracking_id(token.audit_tracking_id.clone())
            .with_event_data(serde_json::json!({ "error": error_code }));
        self.write_log(log).await;
    }

    /// Write an audit log entry
    pub async fn write_log(&self, audit_log: AuditLog) {
        if self.config.async_writes {
            let repository = Arc::clone(&self.repository);
            task::spawn(async move {
                if let Err(e) = repository.create(&audit_log).await {
                    warn!(event = audit_log.event_type.as_str(), error = %e, "Failed to write audit log");
                }
            });
        } else if let Err(e) = self.repository.create(&audit_log).await {
            warn!(event = audit_log.event_type.as_str(), error = %e, "Failed to write audit log");
        }
    }
}
