//! Shared configuration and wire types for the core token service
//!
//! This crate provides common functionality used across all workspace members:
//! - Configuration types and the layered loader
//! - OAuth2 token-endpoint error body and error codes

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, ClientConfig, ConfigError, DatabaseConfig, Environment, LogFormat,
    LoggingConfig, OAuth2ProviderConfig, RealmOverride, RealmProviderConfig, ReaperConfig,
    ServerConfig,
};
pub use errors::{error_codes, OAuth2ErrorResponse};
