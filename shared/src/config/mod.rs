//! Configuration module with sub-modules per concern
//!
//! This module organizes configuration into logical areas:
//! - `cache` - Identity cache (Redis or in-process) configuration
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection and logging configuration
//! - `oauth2` - OAuth2 provider settings and static client registrations
//! - `reaper` - Expired token reaping schedule, paging and worker pool
//! - `server` - HTTP server configuration

pub mod cache;
pub mod database;
pub mod environment;
pub mod oauth2;
pub mod reaper;
pub mod server;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export commonly used types
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use oauth2::{ClientConfig, OAuth2ProviderConfig, RealmOverride, RealmProviderConfig};
pub use reaper::ReaperConfig;
pub use server::ServerConfig;

/// Prefix for environment variable overrides, e.g. `CTS__REAPER__PAGE_SIZE=500`
pub const ENV_PREFIX: &str = "CTS";

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Identity cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Reaper configuration
    #[serde(default)]
    pub reaper: ReaperConfig,

    /// OAuth2 provider configuration
    #[serde(default)]
    pub oauth2: OAuth2ProviderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl AppConfig {
    /// Baseline configuration for an environment, before files and env overrides
    pub fn for_environment(environment: Environment) -> Self {
        let mut config = Self {
            environment,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::for_environment(environment),
            reaper: ReaperConfig::default(),
            oauth2: OAuth2ProviderConfig::default(),
        };

        if environment.is_production() {
            config.database = DatabaseConfig::new("mysql://cts-db:3306/cts").with_max_connections(50);
            config.cache.enabled = true;
        }

        config
    }

    /// Load configuration for the environment named by `ENVIRONMENT`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_for(Environment::from_env())
    }

    /// Load configuration layered as: environment defaults, then the optional
    /// `config.<environment>.toml` file, then `CTS__*` environment variables
    pub fn load_for(environment: Environment) -> Result<Self, ConfigError> {
        let defaults = Self::for_environment(environment);

        let settings = ::config::Config::builder()
            .add_source(::config::Config::try_from(&defaults)?)
            .add_source(::config::File::with_name(&environment.config_file()).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every sub-configuration eagerly
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.reaper.validate()?;
        self.oauth2.validate()?;
        if self.database.max_connections == 0 {
            return Err(ConfigError::invalid("database.max_connections must be positive"));
        }
        Ok(())
    }
}
