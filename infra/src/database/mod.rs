//! Database module - MySQL implementations using SQLx
//!
//! This module provides the database access layer:
//! - Connection pool management and schema migrations
//! - The `cts_tokens` token store and its keyset-paged reaper queries
//! - Audit log persistence and resource owner lookups

pub mod connection;
pub mod mysql;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use connection::{DatabasePool, PoolStatistics};
pub use mysql::{
    KeysetPage, MySqlAuditLogRepository, MySqlIdentityManager, MySqlReaperQuery, MySqlTokenStore,
    OwnerStatus, TokenRecord,
};
