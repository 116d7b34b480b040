//! Grant type dispatch for the token endpoint.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::exchange::RefreshTokenExchange;
use crate::domain::entities::token::{AccessToken, REFRESH_TOKEN_GRANT};
use crate::domain::value_objects::request::{params, OAuth2Request};
use crate::errors::OAuth2Error;

/// Issues access tokens for one grant type
#[async_trait]
pub trait GrantTypeHandler: Send + Sync {
    fn grant_type(&self) -> &str;

    async fn handle(&self, request: &OAuth2Request) -> Result<AccessToken, OAuth2Error>;
}

/// The `refresh_token` grant
pub struct RefreshTokenGrantHandler {
    exchange: Arc<RefreshTokenExchange>,
}

impl RefreshTokenGrantHandler {
    pub fn new(exchange: Arc<RefreshTokenExchange>) -> Self {
        Self { exchange }
    }
}

#[async_trait]
impl GrantTypeHandler for RefreshTokenGrantHandler {
    fn grant_type(&self) -> &str {
        REFRESH_TOKEN_GRANT
    }

    async fn handle(&self, request: &OAuth2Request) -> Result<AccessToken, OAuth2Error> {
        self.exchange.refresh_token(request).await
    }
}

/// Token endpoint service routing requests to grant handlers
#[derive(Default)]
pub struct AccessTokenService {
    handlers: HashMap<String, Arc<dyn GrantTypeHandler>>,
}

impl AccessTokenService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Service with the refresh token grant registered
    pub fn with_refresh_token_grant(exchange: Arc<RefreshTokenExchange>) -> Self {
        Self::new().with_handler(Arc::new(RefreshTokenGrantHandler::new(exchange)))
    }

    pub fn with_handler(mut self, handler: Arc<dyn GrantTypeHandler>) -> Self {
        self.register(handler);
        self
    }

    /// Register a handler, replacing any handler of the same grant type
    pub fn register(&mut self, handler: Arc<dyn GrantTypeHandler>) {
        self.handlers
            .insert(handler.grant_type().to_string(), handler);
    }

    pub fn supports(&self, grant_type: &str) -> bool {
        self.handlers.contains_key(grant_type)
    }

    /// Issue an access token for the request's grant type
    pub async fn request_access_token(
        &self,
        request: &OAuth2Request,
    ) -> Result<AccessToken, OAuth2Error> {
        let grant_type = request
            .non_empty_parameter(params::GRANT_TYPE)
            .ok_or_else(|| OAuth2Error::invalid_request("Missing parameter, 'grant_type'"))?;

        let handler = self.handlers.get(grant_type).ok_or_else(|| {
            debug!(grant_type, "Unsupported grant type requested");
            OAuth2Error::unsupported_grant_type(format!("Unknown grant type: {}", grant_type))
        })?;

        handler.handle(request).await
    }
}
