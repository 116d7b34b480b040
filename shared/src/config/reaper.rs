//! Expired token reaper configuration

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Registry key of the plain TTL reaper process
pub const PROCESS_REAPER: &str = "reaper";

/// Registry key of the max-session-time expiry process
pub const PROCESS_MAX_SESSION_TIME: &str = "max-session-time";

/// Registry key of the idle-timeout expiry process
pub const PROCESS_IDLE_TIMEOUT: &str = "idle-timeout";

/// Reaper scheduling, paging and concurrency settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReaperConfig {
    /// Whether the background reaper tasks are started
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Seconds between two runs of the same process
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,

    /// Maximum number of partial tokens fetched per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Maximum number of concurrent record deletions
    #[serde(default = "default_worker_pool_size")]
    pub worker_pool_size: usize,

    /// Per-record deletion timeout in milliseconds
    #[serde(default = "default_record_timeout_ms")]
    pub record_timeout_ms: u64,

    /// Registry keys of the expiry processes to schedule
    #[serde(default = "default_processes")]
    pub processes: Vec<String>,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_seconds: default_interval_seconds(),
            page_size: default_page_size(),
            worker_pool_size: default_worker_pool_size(),
            record_timeout_ms: default_record_timeout_ms(),
            processes: default_processes(),
        }
    }
}

impl ReaperConfig {
    /// Set the page size
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the worker pool size
    pub fn with_worker_pool_size(mut self, size: usize) -> Self {
        self.worker_pool_size = size;
        self
    }

    /// Set the per-record timeout in milliseconds
    pub fn with_record_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.record_timeout_ms = timeout_ms;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::invalid("reaper.page_size must be positive"));
        }
        if self.worker_pool_size == 0 {
            return Err(ConfigError::invalid("reaper.worker_pool_size must be positive"));
        }
        if self.interval_seconds == 0 {
            return Err(ConfigError::invalid("reaper.interval_seconds must be positive"));
        }
        if self.record_timeout_ms == 0 {
            return Err(ConfigError::invalid("reaper.record_timeout_ms must be positive"));
        }
        if self.enabled && self.processes.is_empty() {
            return Err(ConfigError::invalid(
                "reaper.processes must name at least one process when the reaper is enabled",
            ));
        }
        Ok(())
    }
}

fn default_enabled() -> bool {
    true
}

fn default_interval_seconds() -> u64 {
    60
}

fn default_page_size() -> usize {
    1000
}

fn default_worker_pool_size() -> usize {
    8
}

fn default_record_timeout_ms() -> u64 {
    5000
}

fn default_processes() -> Vec<String> {
    vec![
        PROCESS_REAPER.to_string(),
        PROCESS_MAX_SESSION_TIME.to_string(),
        PROCESS_IDLE_TIMEOUT.to_string(),
    ]
}
