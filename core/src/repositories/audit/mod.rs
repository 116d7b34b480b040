//! Audit log repository module.

mod r#trait;
pub use r#trait::AuditLogRepository;

mod noop;
pub use noop::NoOpAuditLogRepository;

mod memory;
pub use memory::InMemoryAuditLogRepository;
