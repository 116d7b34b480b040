//! Token store trait defining the persistence contract for OAuth2 tokens and sessions.

use async_trait::async_trait;

use crate::domain::entities::token::{AccessToken, NewAccessToken, NewRefreshToken, RefreshToken};
use crate::errors::DomainResult;

/// Persistence abstraction for access tokens, refresh tokens and sessions
///
/// "Not found" is always `Ok(None)` or `Ok(false)`, never an error. Store
/// failures surface as `CoreTokenError::StoreUnavailable` or
/// `OAuth2Error::Server`.
///
/// # Idempotence
/// Deletes of unknown ids succeed with `Ok(false)`. The reaper and the
/// refresh exchange may both delete the same id concurrently; whichever runs
/// second observes `Ok(false)`.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Read a refresh token by id
    ///
    /// Every store answers for records of any kind: an access token or a
    /// session under `id` is returned through the refresh token projection
    /// with its own `token_type`, never hidden as `None`.
    ///
    /// # Returns
    /// * `Ok(Some(RefreshToken))` - A record exists under the id. Its
    ///   `token_type` is whatever the store holds, callers must check it.
    /// * `Ok(None)` - No record with the id
    async fn read_refresh_token(&self, id: &str) -> DomainResult<Option<RefreshToken>>;

    /// Persist a new refresh token, generating its id and expiry
    async fn create_refresh_token(&self, token: NewRefreshToken) -> DomainResult<RefreshToken>;

    /// Delete a refresh token
    ///
    /// # Returns
    /// * `Ok(true)` - The record was removed
    /// * `Ok(false)` - No record existed
    async fn delete_refresh_token(&self, id: &str) -> DomainResult<bool>;

    /// Persist a new access token, generating its id and expiry
    async fn create_access_token(&self, token: NewAccessToken) -> DomainResult<AccessToken>;

    /// Read an access token by id
    async fn read_access_token(&self, id: &str) -> DomainResult<Option<AccessToken>>;

    /// Delete a record of any kind, used by the reaper
    ///
    /// # Returns
    /// * `Ok(true)` - The record was removed
    /// * `Ok(false)` - No record existed
    async fn delete_token(&self, id: &str) -> DomainResult<bool>;
}
