//! MySQL implementation of the TokenStore trait.
//!
//! Sessions, access tokens and refresh tokens share the `cts_tokens` table;
//! `token_type` tells them apart. The same store opens the reaper's
//! keyset-paged queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use std::collections::BTreeMap;
use tracing::debug;

use cts_core::domain::entities::token::{
    AccessToken, NewAccessToken, NewRefreshToken, OwnerRef, RefreshToken, TokenType, BEARER,
};
use cts_core::domain::value_objects::scope::{join_scope, split_scope};
use cts_core::errors::{DomainError, DomainResult};
use cts_core::repositories::query::{ReaperFilter, ReaperQuery, ReaperQueryFactory};
use cts_core::repositories::token::TokenStore;

use super::reaper_query::{KeysetPage, MySqlReaperQuery};
use crate::InfrastructureError;

const SELECT_COLUMNS: &str = r#"
    SELECT id, token_type, grant_type, owner_id, owner_realm, client_id, scope,
           redirect_uri, claims, auth_grant_id, refresh_token_id, audit_tracking_id,
           expires_at, idle_expires_at, max_session_expires_at, created_at
    FROM cts_tokens
"#;

/// One row of `cts_tokens`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub id: String,
    pub token_type: String,
    pub grant_type: String,
    pub owner_id: String,
    pub owner_realm: String,
    pub client_id: String,
    /// Space-delimited scope
    pub scope: Option<String>,
    pub redirect_uri: Option<String>,
    pub claims: Option<String>,
    pub auth_grant_id: Option<String>,
    pub refresh_token_id: Option<String>,
    pub audit_tracking_id: String,
    pub expires_at: DateTime<Utc>,
    pub idle_expires_at: Option<DateTime<Utc>>,
    pub max_session_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TokenRecord {
    pub fn from_row(row: &MySqlRow) -> Result<Self, InfrastructureError> {
        Ok(Self {
            id: row.try_get("id")?,
            token_type: row.try_get("token_type")?,
            grant_type: row.try_get("grant_type")?,
            owner_id: row.try_get("owner_id")?,
            owner_realm: row.try_get("owner_realm")?,
            client_id: row.try_get("client_id")?,
            scope: row.try_get("scope")?,
            redirect_uri: row.try_get("redirect_uri")?,
            claims: row.try_get("claims")?,
            auth_grant_id: row.try_get("auth_grant_id")?,
            refresh_token_id: row.try_get("refresh_token_id")?,
            audit_tracking_id: row.try_get("audit_tracking_id")?,
            expires_at: row.try_get("expires_at")?,
            idle_expires_at: row.try_get("idle_expires_at")?,
            max_session_expires_at: row.try_get("max_session_expires_at")?,
            created_at: row.try_get("created_at")?,
        })
    }

    pub fn from_refresh_token(token: &RefreshToken) -> Self {
        Self {
            id: token.id.clone(),
            token_type: token.token_type.as_str().to_string(),
            grant_type: token.grant_type.clone(),
            owner_id: token.owner.id.clone(),
            owner_realm: token.owner.realm.clone(),
            client_id: token.client_id.clone(),
            scope: non_empty_scope(&join_scope(&token.scope)),
            redirect_uri: token.redirect_uri.clone(),
            claims: token.claims.clone(),
            auth_grant_id: token.auth_grant_id.clone(),
            refresh_token_id: None,
            audit_tracking_id: token.audit_tracking_id.clone(),
            expires_at: token.expires_at,
            idle_expires_at: None,
            max_session_expires_at: None,
            created_at: token.created_at,
        }
    }

    pub fn from_access_token(token: &AccessToken) -> Self {
        Self {
            id: token.id.clone(),
            token_type: TokenType::AccessToken.as_str().to_string(),
            grant_type: token.grant_type.clone(),
            owner_id: token.owner.id.clone(),
            owner_realm: token.owner.realm.clone(),
            client_id: token.client_id.clone(),
            scope: non_empty_scope(&join_scope(&token.scope)),
            redirect_uri: token.redirect_uri.clone(),
            claims: token.claims.clone(),
            auth_grant_id: None,
            refresh_token_id: token.refresh_token_id.clone(),
            audit_tracking_id: token.audit_tracking_id.clone(),
            expires_at: token.expires_at,
            idle_expires_at: None,
            max_session_expires_at: None,
            created_at: token.created_at,
        }
    }

    pub fn kind(&self) -> Result<TokenType, InfrastructureError> {
        TokenType::parse(&self.token_type).ok_or_else(|| {
            InfrastructureError::decode(format!(
                "token {} has unknown token_type '{}'",
                self.id, self.token_type
            ))
        })
    }

    /// Decode as a refresh token, keeping the stored record kind
    pub fn into_refresh_token(self) -> Result<RefreshToken, InfrastructureError> {
        Ok(RefreshToken {
            token_type: self.kind()?,
            owner: OwnerRef::new(self.owner_id, self.owner_realm),
            scope: split_scope(self.scope.as_deref()),
            id: self.id,
            grant_type: self.grant_type,
            client_id: self.client_id,
            redirect_uri: self.redirect_uri,
            claims: self.claims,
            auth_grant_id: self.auth_grant_id,
            audit_tracking_id: self.audit_tracking_id,
            expires_at: self.expires_at,
            created_at: self.created_at,
        })
    }

    pub fn into_access_token(self) -> Result<AccessToken, InfrastructureError> {
        Ok(AccessToken {
            owner: OwnerRef::new(self.owner_id, self.owner_realm),
            scope: split_scope(self.scope.as_deref()),
            id: self.id,
            token_type: BEARER.to_string(),
            grant_type: self.grant_type,
            client_id: self.client_id,
            redirect_uri: self.redirect_uri,
            refresh_token_id: self.refresh_token_id,
            claims: self.claims,
            audit_tracking_id: self.audit_tracking_id,
            expires_at: self.expires_at,
            created_at: self.created_at,
            extra_data: BTreeMap::new(),
        })
    }
}

fn non_empty_scope(scope: &str) -> Option<String> {
    (!scope.is_empty()).then(|| scope.to_string())
}

fn store_error(e: sqlx::Error) -> DomainError {
    InfrastructureError::Database(e).into()
}

/// MySQL implementation of TokenStore and ReaperQueryFactory
#[derive(Clone)]
pub struct MySqlTokenStore {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlTokenStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn insert(&self, record: &TokenRecord) -> DomainResult<()> {
        let query = r#"
            INSERT INTO cts_tokens (
                id, token_type, grant_type, owner_id, owner_realm, client_id, scope,
                redirect_uri, claims, auth_grant_id, refresh_token_id, audit_tracking_id,
                expires_at, idle_expires_at, max_session_expires_at, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(&record.id)
            .bind(&record.token_type)
            .bind(&record.grant_type)
            .bind(&record.owner_id)
            .bind(&record.owner_realm)
            .bind(&record.client_id)
            .bind(&record.scope)
            .bind(&record.redirect_uri)
            .bind(&record.claims)
            .bind(&record.auth_grant_id)
            .bind(&record.refresh_token_id)
            .bind(&record.audit_tracking_id)
            .bind(record.expires_at)
            .bind(record.idle_expires_at)
            .bind(record.max_session_expires_at)
            .bind(record.created_at)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(())
    }

    async fn find(&self, id: &str) -> DomainResult<Option<TokenRecord>> {
        let query = format!("{} WHERE id = ? LIMIT 1", SELECT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(row.as_ref().map(TokenRecord::from_row).transpose()?)
    }

    async fn delete(&self, id: &str) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM cts_tokens WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        let deleted = result.rows_affected() > 0;
        if !deleted {
            debug!(token_id = id, "Token already gone");
        }
        Ok(deleted)
    }
}

#[async_trait]
impl TokenStore for MySqlTokenStore {
    async fn read_refresh_token(&self, id: &str) -> DomainResult<Option<RefreshToken>> {
        Ok(self
            .find(id)
            .await?
            .map(TokenRecord::into_refresh_token)
            .transpose()?)
    }

    async fn create_refresh_token(&self, token: NewRefreshToken) -> DomainResult<RefreshToken> {
        let token = token.into_token(Utc::now());
        self.insert(&TokenRecord::from_refresh_token(&token)).await?;
        Ok(token)
    }

    async fn delete_refresh_token(&self, id: &str) -> DomainResult<bool> {
        self.delete(id).await
    }

    async fn create_access_token(&self, token: NewAccessToken) -> DomainResult<AccessToken> {
        let token = token.into_token(Utc::now());
        self.insert(&TokenRecord::from_access_token(&token)).await?;
        Ok(token)
    }

    async fn read_access_token(&self, id: &str) -> DomainResult<Option<AccessToken>> {
        match self.find(id).await? {
            Some(record) if record.kind()? == TokenType::AccessToken => {
                Ok(Some(record.into_access_token()?))
            }
            _ => Ok(None),
        }
    }

    async fn delete_token(&self, id: &str) -> DomainResult<bool> {
        self.delete(id).await
    }
}

#[async_trait]
impl ReaperQueryFactory for MySqlTokenStore {
    async fn open(
        &self,
        filter: ReaperFilter,
        cutoff: DateTime<Utc>,
        page_size: usize,
    ) -> DomainResult<Box<dyn ReaperQuery>> {
        Ok(Box::new(MySqlReaperQuery::new(
            self.pool.clone(),
            KeysetPage::new(filter, cutoff, page_size),
        )))
    }
}
