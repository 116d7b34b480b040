//! Business services containing domain logic and use cases.

pub mod audit;
pub mod oauth2;
pub mod reaper;

// Re-export commonly used types
pub use audit::{AuditService, AuditServiceConfig};
pub use oauth2::{
    AccessTokenService, AuditContext, ClientAuthenticator, ConfigProviderSettingsFactory,
    ConfigUrisFactory, DefaultProviderSettings, GrantTypeHandler, OAuth2Uris, OAuth2UrisFactory,
    ProviderSettings, ProviderSettingsFactory, RecordingAuditContext, RefreshTokenExchange,
    RefreshTokenGrantHandler, SecretClientAuthenticator, TracingAuditContext,
};
pub use reaper::{
    spawn_reaper_task, spawn_reapers, BatchReaper, BatchTally, CompletionGuard, CompletionSignal,
    CountDownLatch, ExpiryProcess, ExpiryProcessKind, ProcessDependencies, ProcessRegistry,
    ReapStats, RecordOutcome, SessionExpiryProcess,
};
