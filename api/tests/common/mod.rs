//! In-memory wiring shared by the HTTP tests.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use actix_web::web;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{Duration, Utc};

use cts_api::AppState;
use cts_core::domain::entities::client::ClientRegistration;
use cts_core::domain::entities::identity::Identity;
use cts_core::domain::entities::token::{NewRefreshToken, OwnerRef, RefreshToken};
use cts_core::repositories::{
    InMemoryAuditLogRepository, InMemoryClientRegistry, InMemoryIdentityManager,
    InMemoryTokenStore,
};
use cts_core::services::audit::{AuditService, AuditServiceConfig};
use cts_core::services::oauth2::{
    AccessTokenService, ConfigProviderSettingsFactory, ConfigUrisFactory, RecordingAuditContext,
    RefreshTokenExchange, SecretClientAuthenticator,
};
use cts_shared::OAuth2ProviderConfig;

pub const TOKEN_PATH: &str = "/oauth2/access_token";
pub const CLIENT_ID: &str = "webapp";
pub const CLIENT_SECRET: &str = "s3cret";
pub const OWNER_ID: &str = "demo";
pub const PARTNER_REALM: &str = "/partners";

pub struct TestContext {
    pub store: Arc<InMemoryTokenStore>,
    pub identities: Arc<InMemoryIdentityManager>,
    pub state: web::Data<AppState>,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_config(OAuth2ProviderConfig::default()).await
    }

    pub async fn with_config(config: OAuth2ProviderConfig) -> Self {
        let store = Arc::new(InMemoryTokenStore::new());
        let identities = Arc::new(InMemoryIdentityManager::new());
        let clients = Arc::new(InMemoryClientRegistry::new());

        for realm in ["/", PARTNER_REALM] {
            clients
                .register(
                    ClientRegistration::new(CLIENT_ID, CLIENT_SECRET, realm)
                        .with_allowed_scopes(["read", "write", "profile"]),
                )
                .await;
            identities.add(Identity::active(OWNER_ID, realm)).await;
        }

        let exchange = Arc::new(RefreshTokenExchange::new(
            store.clone(),
            Arc::new(SecretClientAuthenticator::new(clients)),
            identities.clone(),
            Arc::new(ConfigProviderSettingsFactory::new(config.clone())),
            Arc::new(ConfigUrisFactory::new(config.clone())),
            Arc::new(RecordingAuditContext::new()),
            Arc::new(AuditService::new(
                Arc::new(InMemoryAuditLogRepository::new()),
                AuditServiceConfig {
                    async_writes: false,
                },
            )),
        ));

        let service = Arc::new(AccessTokenService::with_refresh_token_grant(exchange));
        let state = web::Data::new(AppState::new(service, config));

        Self {
            store,
            identities,
            state,
        }
    }

    /// Store a refresh token issued to `webapp` for the demo owner
    pub async fn issue(&self, realm: &str, scope: &[&str]) -> RefreshToken {
        let token = NewRefreshToken {
            grant_type: "authorization_code".to_string(),
            client_id: CLIENT_ID.to_string(),
            owner: OwnerRef::new(OWNER_ID, realm),
            redirect_uri: None,
            scope: scope.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            claims: None,
            auth_grant_id: None,
            lifetime: Duration::hours(1),
        }
        .into_token(Utc::now());
        self.store.insert_refresh_token(token.clone()).await;
        token
    }
}

pub fn basic_auth(client_id: &str, client_secret: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", client_id, client_secret))
    )
}
