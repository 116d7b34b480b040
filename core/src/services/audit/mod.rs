//! Audit service module for recording session terminations and refresh exchanges.

mod service;

pub use service::{AuditService, AuditServiceConfig};
