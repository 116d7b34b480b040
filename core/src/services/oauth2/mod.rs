//! OAuth2 token endpoint: refresh token exchange and grant dispatch.

mod audit_context;
mod client_auth;
mod exchange;
mod grant;
mod provider;
mod uris;

pub use audit_context::{AuditContext, RecordingAuditContext, TracingAuditContext, OAUTH2_GRANT};
pub use client_auth::{ClientAuthenticator, SecretClientAuthenticator};
pub use exchange::{RefreshTokenExchange, EXTRA_REFRESH_TOKEN, EXTRA_SCOPE};
pub use grant::{AccessTokenService, GrantTypeHandler, RefreshTokenGrantHandler};
pub use provider::{
    ConfigProviderSettingsFactory, DefaultProviderSettings, ProviderSettings,
    ProviderSettingsFactory,
};
pub use uris::{ConfigUrisFactory, OAuth2Uris, OAuth2UrisFactory};

#[cfg(test)]
mod tests;
