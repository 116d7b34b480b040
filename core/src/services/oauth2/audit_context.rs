//! Side channel carrying audit correlation ids for the current request.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::errors::{DomainError, DomainResult};

/// Property under which the refresh token's audit tracking id is recorded
pub const OAUTH2_GRANT: &str = "oauth2_grant";

/// Request-scoped audit properties
pub trait AuditContext: Send + Sync {
    fn put_property(&self, key: &str, value: &str) -> DomainResult<()>;
}

/// Records properties as fields of the current tracing span
///
/// Fields the span did not declare are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditContext;

impl AuditContext for TracingAuditContext {
    fn put_property(&self, key: &str, value: &str) -> DomainResult<()> {
        tracing::Span::current().record(key, value);
        Ok(())
    }
}

/// Keeps properties in memory
#[derive(Debug, Default)]
pub struct RecordingAuditContext {
    properties: Mutex<HashMap<String, String>>,
    should_fail: AtomicBool,
}

impl RecordingAuditContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    pub fn property(&self, key: &str) -> Option<String> {
        self.properties
            .lock()
            .ok()
            .and_then(|properties| properties.get(key).cloned())
    }
}

impl AuditContext for RecordingAuditContext {
    fn put_property(&self, key: &str, value: &str) -> DomainResult<()> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::internal("audit context unavailable"));
        }
        self.properties
            .lock()
            .map_err(|_| DomainError::internal("audit context lock poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
