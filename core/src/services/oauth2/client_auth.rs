//! Client authentication at the token endpoint.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::domain::entities::client::ClientRegistration;
use crate::domain::value_objects::request::OAuth2Request;
use crate::errors::{DomainResult, OAuth2Error};
use crate::repositories::client::ClientRegistry;

/// Authenticates the client making a token request
#[async_trait]
pub trait ClientAuthenticator: Send + Sync {
    /// # Returns
    /// * `Ok(ClientRegistration)` - The authenticated client
    /// * `Err(OAuth2Error::InvalidClient)` - Authentication failed
    async fn authenticate(
        &self,
        request: &OAuth2Request,
        token_endpoint: &str,
    ) -> DomainResult<ClientRegistration>;
}

/// Authenticates `client_id`/`client_secret` against a client registry
///
/// Unknown clients and wrong secrets fail identically.
pub struct SecretClientAuthenticator {
    registry: Arc<dyn ClientRegistry>,
}

impl SecretClientAuthenticator {
    pub fn new(registry: Arc<dyn ClientRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl ClientAuthenticator for SecretClientAuthenticator {
    async fn authenticate(
        &self,
        request: &OAuth2Request,
        token_endpoint: &str,
    ) -> DomainResult<ClientRegistration> {
        if let Some(reason) = request.rejected_authorization() {
            debug!(realm = %request.realm, token_endpoint, reason, "Authorization header rejected");
            return Err(OAuth2Error::invalid_client(reason).into());
        }

        let credentials = request
            .client_credentials()
            .ok_or_else(|| OAuth2Error::invalid_client("Client authentication failed"))?;

        let client = self
            .registry
            .find_client(&credentials.client_id, &request.realm)
            .await?;

        match client {
            Some(client) if client.verify_secret(&credentials.client_secret) => Ok(client),
            _ => {
                debug!(
                    client_id = %credentials.client_id,
                    realm = %request.realm,
                    token_endpoint,
                    "Client authentication failed"
                );
                Err(OAuth2Error::invalid_client("Client authentication failed").into())
            }
        }
    }
}
