//! Collaborator traits and their in-memory implementations.

pub mod audit;
pub mod client;
pub mod identity;
pub mod query;
pub mod token;

pub use audit::{AuditLogRepository, InMemoryAuditLogRepository, NoOpAuditLogRepository};
pub use client::{ClientRegistry, InMemoryClientRegistry};
pub use identity::{
    CachedIdentityManager, IdentityCache, IdentityManager, InMemoryIdentityManager, TtlCache,
};
pub use query::{InMemoryReaperQuery, ReaperFilter, ReaperQuery, ReaperQueryFactory};
pub use token::{InMemoryTokenStore, TokenStore};
