//! OAuth2 token records and session token kinds.

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use uuid::Uuid;

use crate::domain::value_objects::scope::join_scope;

/// Token type issued for every access token
pub const BEARER: &str = "Bearer";

/// Grant type name of the refresh token grant
pub const REFRESH_TOKEN_GRANT: &str = "refresh_token";

/// Length of generated token identifiers
pub const TOKEN_ID_LENGTH: usize = 32;

/// Generate an opaque, URL-safe token identifier
pub fn generate_token_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_ID_LENGTH)
        .map(char::from)
        .collect()
}

/// Kind of record held in the token store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Session,
    AccessToken,
    RefreshToken,
}

impl TokenType {
    /// Convert to string representation for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::AccessToken => "access_token",
            Self::RefreshToken => "refresh_token",
        }
    }

    /// Parse from string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "session" => Some(Self::Session),
            "access_token" => Some(Self::AccessToken),
            "refresh_token" => Some(Self::RefreshToken),
            _ => None,
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a resource owner within a realm
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerRef {
    pub id: String,
    pub realm: String,
}

impl OwnerRef {
    pub fn new(id: impl Into<String>, realm: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            realm: realm.into(),
        }
    }
}

impl fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.realm)
    }
}

/// A stored refresh token
///
/// `token_type` is whatever the store recorded under the id; the exchange
/// rejects records that are not refresh-type grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    pub id: String,
    pub token_type: TokenType,
    pub grant_type: String,
    pub owner: OwnerRef,
    pub client_id: String,
    pub scope: BTreeSet<String>,
    pub redirect_uri: Option<String>,
    /// Requested claims as a raw JSON document
    pub claims: Option<String>,
    /// Id of the authorization grant this token descends from
    pub auth_grant_id: Option<String>,
    pub audit_tracking_id: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_refresh_grant(&self) -> bool {
        self.token_type == TokenType::RefreshToken
    }
}

/// Input for creating a refresh token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRefreshToken {
    pub grant_type: String,
    pub client_id: String,
    pub owner: OwnerRef,
    pub redirect_uri: Option<String>,
    pub scope: BTreeSet<String>,
    pub claims: Option<String>,
    pub auth_grant_id: Option<String>,
    pub lifetime: Duration,
}

impl NewRefreshToken {
    /// Materialize the record with a fresh id and tracking id
    pub fn into_token(self, now: DateTime<Utc>) -> RefreshToken {
        RefreshToken {
            id: generate_token_id(),
            token_type: TokenType::RefreshToken,
            grant_type: self.grant_type,
            owner: self.owner,
            client_id: self.client_id,
            scope: self.scope,
            redirect_uri: self.redirect_uri,
            claims: self.claims,
            auth_grant_id: self.auth_grant_id,
            audit_tracking_id: Uuid::new_v4().to_string(),
            expires_at: now + self.lifetime,
            created_at: now,
        }
    }
}

/// A stored access token together with the extra data returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub id: String,
    /// Always [`BEARER`] for tokens issued here
    pub token_type: String,
    pub grant_type: String,
    pub owner: OwnerRef,
    pub client_id: String,
    pub redirect_uri: Option<String>,
    pub scope: BTreeSet<String>,
    /// Refresh token backing this access token
    pub refresh_token_id: Option<String>,
    pub claims: Option<String>,
    pub audit_tracking_id: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    /// Additional fields merged into the token endpoint response
    #[serde(default)]
    pub extra_data: BTreeMap<String, String>,
}

impl AccessToken {
    pub fn add_extra_data(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.extra_data.insert(key.into(), value.into());
    }

    /// Seconds until expiry, never negative
    pub fn expires_in(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }

    pub fn scope_string(&self) -> String {
        join_scope(&self.scope)
    }

    /// Render the token endpoint JSON body
    pub fn to_response_map(&self, now: DateTime<Utc>) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("access_token".to_string(), Value::from(self.id.clone()));
        map.insert("token_type".to_string(), Value::from(self.token_type.clone()));
        map.insert("expires_in".to_string(), Value::from(self.expires_in(now)));
        for (key, value) in &self.extra_data {
            map.insert(key.clone(), Value::from(value.clone()));
        }
        map
    }
}

/// Input for creating an access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccessToken {
    pub grant_type: String,
    pub token_type: String,
    pub owner: OwnerRef,
    pub client_id: String,
    pub redirect_uri: Option<String>,
    pub scope: BTreeSet<String>,
    pub refresh_token_id: Option<String>,
    pub claims: Option<String>,
    pub lifetime: Duration,
}

impl NewAccessToken {
    /// Materialize the record with a fresh id and tracking id
    pub fn into_token(self, now: DateTime<Utc>) -> AccessToken {
        AccessToken {
            id: generate_token_id(),
            token_type: self.token_type,
            grant_type: self.grant_type,
            owner: self.owner,
            client_id: self.client_id,
            redirect_uri: self.redirect_uri,
            scope: self.scope,
            refresh_token_id: self.refresh_token_id,
            claims: self.claims,
            audit_tracking_id: Uuid::new_v4().to_string(),
            expires_at: now + self.lifetime,
            created_at: now,
            extra_data: BTreeMap::new(),
        }
    }
}
