//! Client registry contract.

use async_trait::async_trait;

use crate::domain::entities::client::ClientRegistration;
use crate::errors::DomainResult;

/// Lookup of registered OAuth2 clients
#[async_trait]
pub trait ClientRegistry: Send + Sync {
    /// Find a client registered in `realm`
    ///
    /// # Returns
    /// * `Ok(Some(ClientRegistration))` - Client found
    /// * `Ok(None)` - No such client in the realm
    async fn find_client(&self, client_id: &str, realm: &str)
        -> DomainResult<Option<ClientRegistration>>;
}
