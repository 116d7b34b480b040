//! In-memory client registry, also used for statically configured clients.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use cts_shared::ClientConfig;

use super::r#trait::ClientRegistry;
use crate::domain::entities::client::ClientRegistration;
use crate::errors::DomainResult;

/// Client registry keyed by realm and client id
#[derive(Clone, Default)]
pub struct InMemoryClientRegistry {
    clients: Arc<RwLock<HashMap<(String, String), ClientRegistration>>>,
}

impl InMemoryClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from configured clients
    pub fn from_config(clients: &[ClientConfig]) -> Self {
        let map = clients
            .iter()
            .map(|c| {
                let registration = ClientRegistration::with_secret_hash(
                    c.client_id.clone(),
                    c.client_secret_sha256.clone(),
                    c.realm.clone(),
                )
                .with_allowed_scopes(c.allowed_scopes.iter().cloned());
                ((c.realm.clone(), c.client_id.clone()), registration)
            })
            .collect();
        Self {
            clients: Arc::new(RwLock::new(map)),
        }
    }

    pub async fn register(&self, client: ClientRegistration) {
        self.clients
            .write()
            .await
            .insert((client.realm.clone(), client.client_id.clone()), client);
    }
}

#[async_trait]
impl ClientRegistry for InMemoryClientRegistry {
    async fn find_client(
        &self,
        client_id: &str,
        realm: &str,
    ) -> DomainResult<Option<ClientRegistration>> {
        Ok(self
            .clients
            .read()
            .await
            .get(&(realm.to_string(), client_id.to_string()))
            .cloned())
    }
}
