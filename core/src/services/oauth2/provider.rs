//! Per-realm OAuth2 provider settings and policy hooks.

use async_trait::async_trait;
use chrono::Duration;
use std::collections::BTreeSet;
use std::sync::Arc;

use cts_shared::{OAuth2ProviderConfig, RealmProviderConfig};

use crate::domain::entities::client::ClientRegistration;
use crate::domain::entities::token::AccessToken;
use crate::domain::value_objects::request::OAuth2Request;
use crate::errors::{DomainResult, OAuth2Error};

/// Provider settings and policy for one realm
#[async_trait]
pub trait ProviderSettings: Send + Sync {
    fn realm(&self) -> &str;

    /// Whether refreshing rotates the refresh token
    fn issue_refresh_tokens_on_refreshing(&self) -> bool;

    fn access_token_lifetime(&self) -> Duration;

    fn refresh_token_lifetime(&self) -> Duration;

    /// Validate the scope requested on refresh against the token's scope
    ///
    /// # Returns
    /// * `Ok(scope)` - The scope to carry forward
    /// * `Err(OAuth2Error::InvalidScope)` - The request asks for more than allowed
    async fn validate_refresh_token_scope(
        &self,
        client: &ClientRegistration,
        requested: &BTreeSet<String>,
        token_scope: &BTreeSet<String>,
        request: &OAuth2Request,
    ) -> DomainResult<BTreeSet<String>>;

    /// Re-validate claims carried by a refresh token
    async fn validate_requested_claims(&self, claims: Option<&str>) -> DomainResult<Option<String>>;

    /// Hook attaching additional response data to an issued access token
    async fn additional_data_to_return_from_token_endpoint(
        &self,
        token: &mut AccessToken,
        request: &OAuth2Request,
    ) -> DomainResult<()>;
}

/// Standard provider policy driven by configuration
#[derive(Debug, Clone)]
pub struct DefaultProviderSettings {
    config: RealmProviderConfig,
}

impl DefaultProviderSettings {
    pub fn new(config: RealmProviderConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProviderSettings for DefaultProviderSettings {
    fn realm(&self) -> &str {
        &self.config.realm
    }

    fn issue_refresh_tokens_on_refreshing(&self) -> bool {
        self.config.issue_refresh_tokens_on_refreshing
    }

    fn access_token_lifetime(&self) -> Duration {
        Duration::seconds(self.config.access_token_lifetime_seconds)
    }

    fn refresh_token_lifetime(&self) -> Duration {
        Duration::seconds(self.config.refresh_token_lifetime_seconds)
    }

    /// An empty request keeps the token's scope; otherwise the request must
    /// be a subset of the token's scope and of the client's allowed scopes.
    async fn validate_refresh_token_scope(
        &self,
        client: &ClientRegistration,
        requested: &BTreeSet<String>,
        token_scope: &BTreeSet<String>,
        _request: &OAuth2Request,
    ) -> DomainResult<BTreeSet<String>> {
        if requested.is_empty() {
            return Ok(token_scope.clone());
        }

        if !requested.is_subset(token_scope) {
            let extra: Vec<&str> = requested
                .difference(token_scope)
                .map(String::as_str)
                .collect();
            return Err(OAuth2Error::invalid_scope(format!(
                "Scope not granted to the refresh token: {}",
                extra.join(" ")
            ))
            .into());
        }

        if !client.permits_scope(requested) {
            return Err(OAuth2Error::invalid_scope("Scope not allowed for this client").into());
        }

        Ok(requested.clone())
    }

    async fn validate_requested_claims(&self, claims: Option<&str>) -> DomainResult<Option<String>> {
        let Some(claims) = claims.filter(|c| !c.trim().is_empty()) else {
            return Ok(None);
        };
        match serde_json::from_str::<serde_json::Value>(claims) {
            Ok(serde_json::Value::Object(_)) => Ok(Some(claims.to_string())),
            _ => Err(OAuth2Error::invalid_request("Requested claims must be a JSON object").into()),
        }
    }

    async fn additional_data_to_return_from_token_endpoint(
        &self,
        _token: &mut AccessToken,
        _request: &OAuth2Request,
    ) -> DomainResult<()> {
        Ok(())
    }
}

/// Resolves provider settings for a request
#[async_trait]
pub trait ProviderSettingsFactory: Send + Sync {
    async fn get(&self, request: &OAuth2Request) -> DomainResult<Arc<dyn ProviderSettings>>;
}

/// Provider settings factory backed by [`OAuth2ProviderConfig`]
#[derive(Debug, Clone)]
pub struct ConfigProviderSettingsFactory {
    config: OAuth2ProviderConfig,
}

impl ConfigProviderSettingsFactory {
    pub fn new(config: OAuth2ProviderConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProviderSettingsFactory for ConfigProviderSettingsFactory {
    async fn get(&self, request: &OAuth2Request) -> DomainResult<Arc<dyn ProviderSettings>> {
        Ok(Arc::new(DefaultProviderSettings::new(
            self.config.for_realm(&request.realm),
        )))
    }
}
