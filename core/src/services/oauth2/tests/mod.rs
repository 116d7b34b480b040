mod client_auth_tests;
mod exchange_tests;
mod grant_tests;

use chrono::{Duration, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;

use cts_shared::OAuth2ProviderConfig;

use super::*;
use crate::domain::entities::client::ClientRegistration;
use crate::domain::entities::identity::Identity;
use crate::domain::entities::token::{NewRefreshToken, OwnerRef, RefreshToken, REFRESH_TOKEN_GRANT};
use crate::domain::value_objects::request::{params, OAuth2Request};
use crate::repositories::identity::IdentityManager;
use crate::repositories::{
    InMemoryAuditLogRepository, InMemoryClientRegistry, InMemoryIdentityManager,
    InMemoryTokenStore,
};
use crate::services::audit::{AuditService, AuditServiceConfig};

pub(crate) const REALM: &str = "/";
pub(crate) const CLIENT_ID: &str = "webapp";
pub(crate) const CLIENT_SECRET: &str = "s3cret";
pub(crate) const OWNER_ID: &str = "demo";

/// Fully wired in-memory collaborators for the refresh exchange
pub(crate) struct Fixture {
    pub store: Arc<InMemoryTokenStore>,
    pub identities: Arc<InMemoryIdentityManager>,
    pub clients: Arc<InMemoryClientRegistry>,
    pub audit_repository: InMemoryAuditLogRepository,
    pub audit_context: Arc<RecordingAuditContext>,
    pub config: OAuth2ProviderConfig,
}

impl Fixture {
    pub async fn new(rotate: bool) -> Self {
        let fixture = Self {
            store: Arc::new(InMemoryTokenStore::new()),
            identities: Arc::new(InMemoryIdentityManager::new()),
            clients: Arc::new(InMemoryClientRegistry::new()),
            audit_repository: InMemoryAuditLogRepository::new(),
            audit_context: Arc::new(RecordingAuditContext::new()),
            config: OAuth2ProviderConfig {
                issue_refresh_tokens_on_refreshing: rotate,
                ..OAuth2ProviderConfig::default()
            },
        };
        fixture
            .clients
            .register(ClientRegistration::new(CLIENT_ID, CLIENT_SECRET, REALM))
            .await;
        fixture
            .clients
            .register(ClientRegistration::new("other", "other-secret", REALM))
            .await;
        fixture.identities.add(Identity::active(OWNER_ID, REALM)).await;
        fixture
    }

    pub fn exchange(&self) -> RefreshTokenExchange {
        self.exchange_with(self.identities.clone())
    }

    /// Exchange resolving owners through `identities` instead of the fixture's manager
    pub fn exchange_with(&self, identities: Arc<dyn IdentityManager>) -> RefreshTokenExchange {
        RefreshTokenExchange::new(
            self.store.clone(),
            Arc::new(SecretClientAuthenticator::new(self.clients.clone())),
            identities,
            Arc::new(ConfigProviderSettingsFactory::new(self.config.clone())),
            Arc::new(ConfigUrisFactory::new(self.config.clone())),
            self.audit_context.clone(),
            Arc::new(AuditService::new(
                Arc::new(self.audit_repository.clone()),
                AuditServiceConfig {
                    async_writes: false,
                },
            )),
        )
    }

    /// Store a refresh token for `webapp` and the demo owner
    pub async fn issue(&self, scope: &[&str]) -> RefreshToken {
        self.issue_with(scope, |_| {}).await
    }

    pub async fn issue_with(&self, scope: &[&str], adjust: impl FnOnce(&mut RefreshToken)) -> RefreshToken {
        let mut token = NewRefreshToken {
            grant_type: "authorization_code".to_string(),
            client_id: CLIENT_ID.to_string(),
            owner: OwnerRef::new(OWNER_ID, REALM),
            redirect_uri: Some("https://app.example.com/cb".to_string()),
            scope: scope_set(scope),
            claims: None,
            auth_grant_id: Some("grant-1".to_string()),
            lifetime: Duration::hours(1),
        }
        .into_token(Utc::now());
        adjust(&mut token);
        self.store.insert_refresh_token(token.clone()).await;
        token
    }
}

pub(crate) fn scope_set(scope: &[&str]) -> BTreeSet<String> {
    scope.iter().map(|s| s.to_string()).collect()
}

/// A refresh grant request authenticated as `webapp` with HTTP Basic
pub(crate) fn refresh_request(refresh_token: &str) -> OAuth2Request {
    OAuth2Request::new(REALM)
        .with_parameter(params::GRANT_TYPE, REFRESH_TOKEN_GRANT)
        .with_parameter(params::REFRESH_TOKEN, refresh_token)
        .with_basic_credentials(CLIENT_ID, CLIENT_SECRET)
}
