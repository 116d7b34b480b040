//! # CTS Infrastructure
//!
//! Concrete implementations of the core token service collaborators:
//! - **Database**: MySQL token store, reaper queries, audit log and resource
//!   owner lookups using SQLx
//! - **Cache**: Redis client and the Redis-backed identity cache
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)
//! - `redis-cache`: Enable Redis caching support (default)

use cts_core::errors::{CoreTokenError, DomainError};

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Cache module - Redis client and identity cache
pub mod cache;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database driver error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Cached value could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A stored row could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

impl InfrastructureError {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Whether the backing service is unreachable rather than failing one call
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            InfrastructureError::Database(
                sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::Io(_)
                    | sqlx::Error::Tls(_)
            )
        )
    }
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        if err.is_unavailable() {
            CoreTokenError::StoreUnavailable {
                message: err.to_string(),
            }
            .into()
        } else {
            DomainError::internal(err.to_string())
        }
    }
}
