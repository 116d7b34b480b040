//! OAuth2 provider configuration
//!
//! Provider-wide defaults can be overridden per realm, and clients may be
//! registered statically for deployments without a client database.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::ConfigError;

/// Realm name used when a request does not name one
pub const ROOT_REALM: &str = "/";

/// OAuth2 provider settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OAuth2ProviderConfig {
    /// Issue a new refresh token (and delete the old one) on every refresh
    #[serde(default = "default_rotation")]
    pub issue_refresh_tokens_on_refreshing: bool,

    /// Access token lifetime in seconds
    #[serde(default = "default_access_token_lifetime")]
    pub access_token_lifetime_seconds: i64,

    /// Refresh token lifetime in seconds
    #[serde(default = "default_refresh_token_lifetime")]
    pub refresh_token_lifetime_seconds: i64,

    /// Externally visible base URL of this deployment
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the token endpoint, relative to `base_url`
    #[serde(default = "default_token_endpoint_path")]
    pub token_endpoint_path: String,

    /// Per-realm overrides keyed by realm name
    #[serde(default)]
    pub realms: HashMap<String, RealmOverride>,

    /// Statically registered clients
    #[serde(default)]
    pub clients: Vec<ClientConfig>,
}

/// Optional per-realm overrides of the provider defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RealmOverride {
    #[serde(default)]
    pub issue_refresh_tokens_on_refreshing: Option<bool>,
    #[serde(default)]
    pub access_token_lifetime_seconds: Option<i64>,
    #[serde(default)]
    pub refresh_token_lifetime_seconds: Option<i64>,
}

/// Effective provider settings for one realm
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealmProviderConfig {
    pub realm: String,
    pub issue_refresh_tokens_on_refreshing: bool,
    pub access_token_lifetime_seconds: i64,
    pub refresh_token_lifetime_seconds: i64,
}

/// A statically registered OAuth2 client
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    pub client_id: String,

    /// Hex-encoded SHA-256 of the client secret
    pub client_secret_sha256: String,

    #[serde(default = "default_realm")]
    pub realm: String,

    /// Scopes the client may request; empty allows any scope of the grant
    #[serde(default)]
    pub allowed_scopes: Vec<String>,
}

impl Default for OAuth2ProviderConfig {
    fn default() -> Self {
        Self {
            issue_refresh_tokens_on_refreshing: default_rotation(),
            access_token_lifetime_seconds: default_access_token_lifetime(),
            refresh_token_lifetime_seconds: default_refresh_token_lifetime(),
            base_url: default_base_url(),
            token_endpoint_path: default_token_endpoint_path(),
            realms: HashMap::new(),
            clients: Vec::new(),
        }
    }
}

impl OAuth2ProviderConfig {
    /// Resolve the provider settings for a realm, applying any override
    pub fn for_realm(&self, realm: &str) -> RealmProviderConfig {
        let overrides = self.realms.get(realm).cloned().unwrap_or_default();
        RealmProviderConfig {
            realm: realm.to_string(),
            issue_refresh_tokens_on_refreshing: overrides
                .issue_refresh_tokens_on_refreshing
                .unwrap_or(self.issue_refresh_tokens_on_refreshing),
            access_token_lifetime_seconds: overrides
                .access_token_lifetime_seconds
                .unwrap_or(self.access_token_lifetime_seconds),
            refresh_token_lifetime_seconds: overrides
                .refresh_token_lifetime_seconds
                .unwrap_or(self.refresh_token_lifetime_seconds),
        }
    }

    /// Absolute token endpoint URL for a realm
    pub fn token_endpoint(&self, realm: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.token_endpoint_path.trim_start_matches('/');
        if realm == ROOT_REALM || realm.is_empty() {
            format!("{}/{}", base, path)
        } else {
            format!("{}/{}?realm={}", base, path, realm)
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_token_lifetime_seconds <= 0 {
            return Err(ConfigError::invalid(
                "oauth2.access_token_lifetime_seconds must be positive",
            ));
        }
        if self.refresh_token_lifetime_seconds <= 0 {
            return Err(ConfigError::invalid(
                "oauth2.refresh_token_lifetime_seconds must be positive",
            ));
        }
        for (realm, overrides) in &self.realms {
            let bad_access = overrides.access_token_lifetime_seconds.is_some_and(|s| s <= 0);
            let bad_refresh = overrides.refresh_token_lifetime_seconds.is_some_and(|s| s <= 0);
            if bad_access || bad_refresh {
                return Err(ConfigError::invalid(format!(
                    "oauth2.realms.{} lifetimes must be positive",
                    realm
                )));
            }
        }
        if let Some(client) = self.clients.iter().find(|c| c.client_id.is_empty()) {
            return Err(ConfigError::invalid(format!(
                "oauth2 client in realm {} has an empty client_id",
                client.realm
            )));
        }
        Ok(())
    }
}

fn default_rotation() -> bool {
    true
}

fn default_access_token_lifetime() -> i64 {
    3600
}

fn default_refresh_token_lifetime() -> i64 {
    604_800
}

fn default_base_url() -> String {
    String::from("http://localhost:8080")
}

fn default_token_endpoint_path() -> String {
    String::from("/oauth2/access_token")
}

fn default_realm() -> String {
    ROOT_REALM.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realm_override_applies() {
        let mut config = OAuth2ProviderConfig::default();
        config.realms.insert(
            "/customers".to_string(),
            RealmOverride {
                issue_refresh_tokens_on_refreshing: Some(false),
                access_token_lifetime_seconds: Some(600),
                refresh_token_lifetime_seconds: None,
            },
        );

        let customers = config.for_realm("/customers");
        assert!(!customers.issue_refresh_tokens_on_refreshing);
        assert_eq!(customers.access_token_lifetime_seconds, 600);
        assert_eq!(customers.refresh_token_lifetime_seconds, 604_800);

        let root = config.for_realm(ROOT_REALM);
        assert!(root.issue_refresh_tokens_on_refreshing);
        assert_eq!(root.access_token_lifetime_seconds, 3600);
    }

    #[test]
    fn test_token_endpoint() {
        let config = OAuth2ProviderConfig {
            base_url: "https://auth.example.com/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.token_endpoint("/"),
            "https://auth.example.com/oauth2/access_token"
        );
        assert_eq!(
            config.token_endpoint("/staff"),
            "https://auth.example.com/oauth2/access_token?realm=/staff"
        );
    }

    #[test]
    fn test_negative_lifetime_rejected() {
        let mut config = OAuth2ProviderConfig::default();
        config.realms.insert(
            "/bad".to_string(),
            RealmOverride {
                refresh_token_lifetime_seconds: Some(-1),
                ..Default::default()
            },
        );
        assert!(config.validate().is_err());
    }
}
