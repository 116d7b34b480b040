//! Redis cache client implementation
//!
//! Wraps a `ConnectionManager`, which reconnects on its own after the
//! initial connection succeeds. Keys are namespaced with the configured
//! prefix.

use redis::{aio::ConnectionManager, AsyncCommands, Client};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use cts_shared::CacheConfig;

use crate::InfrastructureError;

/// Redis cache client
#[derive(Clone)]
pub struct RedisClient {
    connection: ConnectionManager,
    config: CacheConfig,
}

impl RedisClient {
    /// Connect with the default retry settings (3 attempts, 100ms base delay)
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        Self::new_with_retry_config(config, 3, 100).await
    }

    /// Connect, retrying with exponential backoff
    ///
    /// # Arguments
    /// * `config` - Cache configuration settings
    /// * `max_retries` - Maximum number of connection attempts
    /// * `retry_delay_ms` - Base delay between attempts in milliseconds
    pub async fn new_with_retry_config(
        config: CacheConfig,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<Self, InfrastructureError> {
        info!(url = %mask_url(&config.url), "Creating Redis client");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!(error = %e, "Failed to parse Redis URL");
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let mut attempts = 0;
        let mut delay = retry_delay_ms;
        let connection = loop {
            attempts += 1;
            match ConnectionManager::new(client.clone()).await {
                Ok(connection) => break connection,
                Err(e) if attempts < max_retries => {
                    warn!(
                        attempt = attempts,
                        max_retries,
                        error = %e,
                        "Failed to connect to Redis, retrying in {}ms",
                        delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    // Exponential backoff with cap at 5 seconds
                    delay = (delay * 2).min(5000);
                }
                Err(e) => {
                    error!(attempts, error = %e, "Failed to connect to Redis");
                    return Err(InfrastructureError::Cache(e));
                }
            }
        };

        info!("Redis client created successfully");
        Ok(Self { connection, config })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Namespace a key with the configured prefix
    pub fn key(&self, key: &str) -> String {
        self.config.make_key(key)
    }

    /// Set a value with expiration time
    pub async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<(), InfrastructureError> {
        debug!(key, expiry_seconds, "Setting cache key");
        let mut conn = self.connection.clone();
        conn.set_ex::<_, _, ()>(key, value, expiry_seconds)
            .await
            .map_err(|e| {
                error!(key, error = %e, "Failed to set cache key");
                InfrastructureError::Cache(e)
            })
    }

    /// Get a value from cache
    pub async fn get(&self, key: &str) -> Result<Option<String>, InfrastructureError> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await.map_err(|e| {
            error!(key, error = %e, "Failed to get cache key");
            InfrastructureError::Cache(e)
        })?;
        debug!(key, hit = value.is_some(), "Read cache key");
        Ok(value)
    }

    /// Delete a key; true if it existed
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        let mut conn = self.connection.clone();
        let deleted: u32 = conn.del(key).await.map_err(|e| {
            error!(key, error = %e, "Failed to delete cache key");
            InfrastructureError::Cache(e)
        })?;
        Ok(deleted > 0)
    }

    /// PING the server
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let mut conn = self.connection.clone();
        let response: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(response == "PONG")
    }
}

/// Hide credentials in a Redis URL for logging
pub fn mask_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
