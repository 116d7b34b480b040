//! Explicit registry mapping configuration keys to expiry processes.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use cts_shared::ReaperConfig;

use super::expiry::{ExpiryProcessKind, SessionExpiryProcess};
use super::process::ExpiryProcess;
use crate::errors::{CoreTokenError, DomainResult};
use crate::repositories::token::TokenStore;
use crate::services::audit::AuditService;

/// Collaborators handed to every process factory
#[derive(Clone)]
pub struct ProcessDependencies {
    pub store: Arc<dyn TokenStore>,
    pub audit: Arc<AuditService>,
    /// Worker pool shared by every process built from these dependencies,
    /// bounding concurrent deletes against the store across all processes
    pub workers: Arc<Semaphore>,
    pub record_timeout: Duration,
}

impl ProcessDependencies {
    pub fn new(store: Arc<dyn TokenStore>, audit: Arc<AuditService>, config: &ReaperConfig) -> Self {
        Self {
            store,
            audit,
            workers: Arc::new(Semaphore::new(config.worker_pool_size.max(1))),
            record_timeout: Duration::from_millis(config.record_timeout_ms),
        }
    }
}

/// Builds a process from its dependencies
pub type ProcessFactory = fn(&ProcessDependencies) -> Arc<dyn ExpiryProcess>;

/// Mapping from configuration key to process factory
pub struct ProcessRegistry {
    factories: BTreeMap<String, ProcessFactory>,
}

impl Default for ProcessRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ProcessRegistry {
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry holding the `reaper`, `max-session-time` and `idle-timeout` processes
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(ExpiryProcessKind::Reaper.key(), |deps| {
            build(ExpiryProcessKind::Reaper, deps)
        });
        registry.register(ExpiryProcessKind::MaxSessionTime.key(), |deps| {
            build(ExpiryProcessKind::MaxSessionTime, deps)
        });
        registry.register(ExpiryProcessKind::IdleTimeout.key(), |deps| {
            build(ExpiryProcessKind::IdleTimeout, deps)
        });
        registry
    }

    pub fn register(&mut self, key: impl Into<String>, factory: ProcessFactory) {
        self.factories.insert(key.into(), factory);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build the processes named by `keys`
    ///
    /// Every key is validated before any process is built, so a typo in the
    /// configuration fails startup instead of the first run.
    pub fn resolve(
        &self,
        keys: &[String],
        deps: &ProcessDependencies,
    ) -> DomainResult<Vec<Arc<dyn ExpiryProcess>>> {
        let factories = keys
            .iter()
            .map(|key| {
                self.factories
                    .get(key)
                    .copied()
                    .ok_or_else(|| CoreTokenError::UnknownProcess { key: key.clone() })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(factories.into_iter().map(|factory| factory(deps)).collect())
    }
}

fn build(kind: ExpiryProcessKind, deps: &ProcessDependencies) -> Arc<dyn ExpiryProcess> {
    Arc::new(SessionExpiryProcess::new(
        kind,
        deps.store.clone(),
        deps.audit.clone(),
        deps.workers.clone(),
        deps.record_timeout,
    ))
}
