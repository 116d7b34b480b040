//! Cache module for Redis-based caching
//!
//! Provides the Redis client and the Redis-backed identity cache used to
//! decorate resource owner lookups.

pub mod identity_cache;
pub mod redis_client;

#[cfg(test)]
mod tests;

pub use identity_cache::RedisIdentityCache;
pub use redis_client::RedisClient;

// Re-export commonly used types
pub use cts_shared::CacheConfig;
