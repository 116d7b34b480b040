//! Expiry processes deleting expired sessions and tokens.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, error, warn};

use cts_shared::config::reaper::{PROCESS_IDLE_TIMEOUT, PROCESS_MAX_SESSION_TIME, PROCESS_REAPER};

use super::latch::{CompletionGuard, CountDownLatch};
use super::process::{BatchTally, CompletionSignal, ExpiryProcess, RecordOutcome};
use crate::domain::entities::audit::AuditEventType;
use crate::domain::entities::partial_token::{Batch, ExpiryReason, PartialToken, ReapState};
use crate::errors::{CoreTokenError, DomainError};
use crate::repositories::query::ReaperFilter;
use crate::repositories::token::TokenStore;
use crate::services::audit::AuditService;

/// The flavours of expiry process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpiryProcessKind {
    /// Deletes every record past its TTL
    Reaper,
    /// Terminates sessions past their maximum session time
    MaxSessionTime,
    /// Terminates sessions past their idle timeout
    IdleTimeout,
}

impl ExpiryProcessKind {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Reaper => PROCESS_REAPER,
            Self::MaxSessionTime => PROCESS_MAX_SESSION_TIME,
            Self::IdleTimeout => PROCESS_IDLE_TIMEOUT,
        }
    }

    pub fn filter(&self) -> ReaperFilter {
        match self {
            Self::Reaper => ReaperFilter::ExpiredTokens,
            Self::MaxSessionTime => ReaperFilter::MaxSessionTimeExpired,
            Self::IdleTimeout => ReaperFilter::IdleTimeoutExpired,
        }
    }

    /// Reason recorded for every session this kind terminates, if fixed
    fn forced_reason(&self) -> Option<ExpiryReason> {
        match self {
            Self::Reaper => None,
            Self::MaxSessionTime => Some(ExpiryReason::MaxSessionTime),
            Self::IdleTimeout => Some(ExpiryReason::IdleTimeout),
        }
    }
}

/// State shared by every worker of a process
struct RecordReaper {
    kind: ExpiryProcessKind,
    store: Arc<dyn TokenStore>,
    audit: Arc<AuditService>,
    record_timeout: Duration,
}

impl RecordReaper {
    async fn reap(&self, token: &PartialToken, now: DateTime<Utc>, tally: &BatchTally) {
        let deleted = match timeout(self.record_timeout, self.store.delete_token(&token.id)).await {
            Ok(result) => result,
            Err(_) => Err(CoreTokenError::RecordTimeout {
                token_id: token.id.clone(),
                timeout_ms: self.record_timeout.as_millis() as u64,
            }
            .into()),
        };

        let outcome = match deleted {
            Ok(true) => {
                self.record_reaped(token, now).await;
                RecordOutcome::Reaped
            }
            Ok(false) => {
                debug!(process = self.kind.key(), token_id = %token.id, "Token already gone");
                RecordOutcome::AlreadyGone
            }
            Err(e) if e.is_systemic() => {
                error!(process = self.kind.key(), token_id = %token.id, error = %e, "Token store unavailable");
                tally.record_systemic(e);
                return;
            }
            Err(e) => {
                warn!(process = self.kind.key(), token_id = %token.id, error = %e, "Failed to reap token");
                RecordOutcome::Failed
            }
        };

        debug_assert!(ReapState::PendingReap.can_transition_to(outcome.state()));
        tally.record(outcome);
    }

    async fn record_reaped(&self, token: &PartialToken, now: DateTime<Utc>) {
        if token.is_session() {
            let reason = self
                .kind
                .forced_reason()
                .unwrap_or_else(|| ExpiryReason::classify(token, now));
            self.audit.log_session_terminated(token, reason).await;
        } else {
            debug!(
                process = self.kind.key(),
                token_id = %token.id,
                token_type = token.token_type.as_str(),
                event = AuditEventType::TokenReaped.as_str(),
                "Token reaped"
            );
        }
    }
}

/// Batch handler deleting each record on a bounded worker pool
///
/// Every record gets its own completion guard before anything is spawned,
/// so the batch signal completes exactly once per record even when a worker
/// fails, times out or panics.
pub struct SessionExpiryProcess {
    worker: Arc<RecordReaper>,
    workers: Arc<Semaphore>,
}

impl SessionExpiryProcess {
    pub fn new(
        kind: ExpiryProcessKind,
        store: Arc<dyn TokenStore>,
        audit: Arc<AuditService>,
        workers: Arc<Semaphore>,
        record_timeout: Duration,
    ) -> Self {
        Self {
            worker: Arc::new(RecordReaper {
                kind,
                store,
                audit,
                record_timeout,
            }),
            workers,
        }
    }

    pub fn kind(&self) -> ExpiryProcessKind {
        self.worker.kind
    }
}

impl ExpiryProcess for SessionExpiryProcess {
    fn name(&self) -> &str {
        self.worker.kind.key()
    }

    fn filter(&self) -> ReaperFilter {
        self.worker.kind.filter()
    }

    fn handle_batch(&self, batch: Batch) -> CompletionSignal {
        let latch = CountDownLatch::new(batch.len());
        let tally = Arc::new(BatchTally::default());
        let signal = CompletionSignal::new(latch.clone(), tally.clone());
        let now = Utc::now();

        let work: Vec<(PartialToken, CompletionGuard)> = batch
            .into_tokens()
            .into_iter()
            .map(|token| (token, CompletionGuard::new(latch.clone())))
            .collect();

        let worker = self.worker.clone();
        let workers = self.workers.clone();
        tokio::spawn(async move {
            for (token, guard) in work {
                let permit = match workers.clone().acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        tally.record_systemic(DomainError::internal("reaper worker pool closed"));
                        guard.complete();
                        continue;
                    }
                };

                let worker = worker.clone();
                let tally = tally.clone();
                tokio::spawn(async move {
                    worker.reap(&token, now, &tally).await;
                    drop(permit);
                    guard.complete();
                });
            }
        });

        signal
    }
}
