//! Resource owner identity cache configuration

use serde::{Deserialize, Serialize};

/// Identity cache configuration
///
/// When `enabled` is set the cache is backed by Redis at `url`; otherwise an
/// in-process bounded cache holding at most `max_entries` identities is used.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Use Redis instead of the in-process cache
    #[serde(default)]
    pub enabled: bool,

    /// Redis connection URL
    #[serde(default = "default_url")]
    pub url: String,

    /// Time-to-live of cached identities in seconds
    #[serde(default = "default_ttl")]
    pub default_ttl: u64,

    /// Prefix prepended to every cache key
    #[serde(default)]
    pub key_prefix: Option<String>,

    /// Capacity of the in-process cache
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_url(),
            default_ttl: default_ttl(),
            key_prefix: Some(String::from("cts")),
            max_entries: default_max_entries(),
        }
    }
}

impl CacheConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            enabled: true,
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the key prefix for all cache keys
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Generate a cache key with prefix
    pub fn make_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }
}

fn default_url() -> String {
    String::from("redis://localhost:6379")
}

fn default_ttl() -> u64 {
    300
}

fn default_max_entries() -> usize {
    10_000
}
