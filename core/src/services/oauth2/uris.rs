//! Endpoint URIs of the provider.

use async_trait::async_trait;

use cts_shared::OAuth2ProviderConfig;

use crate::domain::value_objects::request::OAuth2Request;
use crate::errors::DomainResult;

/// Endpoint URIs for one realm
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuth2Uris {
    pub realm: String,
    pub token_endpoint: String,
}

/// Resolves endpoint URIs for a request
#[async_trait]
pub trait OAuth2UrisFactory: Send + Sync {
    async fn get(&self, request: &OAuth2Request) -> DomainResult<OAuth2Uris>;
}

/// URI factory backed by [`OAuth2ProviderConfig`]
#[derive(Debug, Clone)]
pub struct ConfigUrisFactory {
    config: OAuth2ProviderConfig,
}

impl ConfigUrisFactory {
    pub fn new(config: OAuth2ProviderConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl OAuth2UrisFactory for ConfigUrisFactory {
    async fn get(&self, request: &OAuth2Request) -> DomainResult<OAuth2Uris> {
        Ok(OAuth2Uris {
            realm: request.realm.clone(),
            token_endpoint: self.config.token_endpoint(&request.realm),
        })
    }
}
