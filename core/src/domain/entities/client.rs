//! OAuth2 client registration.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

/// A registered OAuth2 client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRegistration {
    pub client_id: String,
    /// Hex-encoded SHA-256 of the client secret
    pub secret_hash: String,
    pub realm: String,
    /// Scopes the client may hold; empty means unrestricted
    pub allowed_scopes: BTreeSet<String>,
    pub default_scopes: BTreeSet<String>,
    pub redirect_uris: Vec<String>,
}

impl ClientRegistration {
    /// Register a client from its plaintext secret
    pub fn new(client_id: impl Into<String>, secret: &str, realm: impl Into<String>) -> Self {
        Self::with_secret_hash(client_id, Self::hash_secret(secret), realm)
    }

    /// Register a client from an already hashed secret
    pub fn with_secret_hash(
        client_id: impl Into<String>,
        secret_hash: impl Into<String>,
        realm: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            secret_hash: secret_hash.into().to_lowercase(),
            realm: realm.into(),
            allowed_scopes: BTreeSet::new(),
            default_scopes: BTreeSet::new(),
            redirect_uris: Vec::new(),
        }
    }

    pub fn with_allowed_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn hash_secret(secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Compare a presented secret against the stored hash in constant time
    pub fn verify_secret(&self, secret: &str) -> bool {
        let presented = Self::hash_secret(secret);
        constant_time_eq::constant_time_eq(presented.as_bytes(), self.secret_hash.as_bytes())
    }

    /// Whether every scope in `scope` is permitted for this client
    pub fn permits_scope(&self, scope: &BTreeSet<String>) -> bool {
        self.allowed_scopes.is_empty() || scope.is_subset(&self.allowed_scopes)
    }
}
