//! Refresh token exchange.
//!
//! Trades a refresh token for a new access token, rotating the refresh token
//! when the realm's provider settings ask for it. The steps run in a fixed
//! order and the first failure ends the exchange; client authentication
//! always happens before the refresh token is looked up.

use std::sync::Arc;
use tracing::{debug, field, info, info_span, warn, Instrument};

use super::audit_context::{AuditContext, OAUTH2_GRANT};
use super::client_auth::ClientAuthenticator;
use super::provider::{ProviderSettings, ProviderSettingsFactory};
use super::uris::OAuth2UrisFactory;
use crate::domain::entities::client::ClientRegistration;
use crate::domain::entities::identity::Identity;
use crate::domain::entities::token::{
    AccessToken, NewAccessToken, NewRefreshToken, RefreshToken, BEARER, REFRESH_TOKEN_GRANT,
};
use crate::domain::value_objects::request::{params, OAuth2Request};
use crate::domain::value_objects::scope::{join_scope, split_scope};
use crate::errors::{DomainError, DomainResult, OAuth2Error};
use crate::repositories::identity::IdentityManager;
use crate::repositories::token::TokenStore;
use crate::services::audit::AuditService;

/// Response key carrying the rotated refresh token id
pub const EXTRA_REFRESH_TOKEN: &str = "refresh_token";
/// Response key carrying the granted scope
pub const EXTRA_SCOPE: &str = "scope";

const OWNER_INVALID: &str = "Resource owner of this refresh token is not valid any more.";

/// Refresh token grant of the token endpoint
pub struct RefreshTokenExchange {
    store: Arc<dyn TokenStore>,
    clients: Arc<dyn ClientAuthenticator>,
    identities: Arc<dyn IdentityManager>,
    providers: Arc<dyn ProviderSettingsFactory>,
    uris: Arc<dyn OAuth2UrisFactory>,
    audit_context: Arc<dyn AuditContext>,
    audit: Arc<AuditService>,
}

impl RefreshTokenExchange {
    pub fn new(
        store: Arc<dyn TokenStore>,
        clients: Arc<dyn ClientAuthenticator>,
        identities: Arc<dyn IdentityManager>,
        providers: Arc<dyn ProviderSettingsFactory>,
        uris: Arc<dyn OAuth2UrisFactory>,
        audit_context: Arc<dyn AuditContext>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self {
            store,
            clients,
            identities,
            providers,
            uris,
            audit_context,
            audit,
        }
    }

    /// Exchange the request's refresh token for a new access token
    ///
    /// # Returns
    /// * `Ok(AccessToken)` - The issued access token; its extra data carries
    ///   the rotated refresh token id and the granted scope
    /// * `Err(OAuth2Error)` - The token endpoint error to report
    pub async fn refresh_token(&self, request: &OAuth2Request) -> Result<AccessToken, OAuth2Error> {
        let span = info_span!(
            "refresh_token",
            realm = %request.realm,
            oauth2_grant = field::Empty,
        );
        self.exchange(request)
            .instrument(span)
            .await
            .map_err(OAuth2Error::from)
    }

    async fn exchange(&self, request: &OAuth2Request) -> DomainResult<AccessToken> {
        let refresh_token_id = request
            .non_empty_parameter(params::REFRESH_TOKEN)
            .ok_or_else(|| OAuth2Error::invalid_request("Missing parameter, 'refresh_token'"))?;

        let provider = self.providers.get(request).await?;
        let uris = self.uris.get(request).await?;

        let client = self
            .clients
            .authenticate(request, &uris.token_endpoint)
            .await?;

        let refresh_token = self
            .store
            .read_refresh_token(refresh_token_id)
            .await?
            .ok_or_else(|| OAuth2Error::invalid_request("RefreshToken does not exist"))?;

        if let Err(e) = self
            .audit_context
            .put_property(OAUTH2_GRANT, &refresh_token.audit_tracking_id)
        {
            warn!(error = %e, "Unable to record audit tracking id");
        }

        match self
            .exchange_found(request, provider.as_ref(), &client, &refresh_token)
            .await
        {
            Ok((access_token, rotated_to)) => {
                self.audit
                    .log_refresh_success(&refresh_token, &access_token, rotated_to.as_deref())
                    .await;
                info!(
                    client_id = %client.client_id,
                    rotated = rotated_to.is_some(),
                    "Refresh token exchanged"
                );
                Ok(access_token)
            }
            Err(e) => {
                let code = OAuth2Error::from(e.clone()).error_code();
                self.audit.log_refresh_failure(&refresh_token, code).await;
                Err(e)
            }
        }
    }

    /// Everything after the refresh token has been found
    async fn exchange_found(
        &self,
        request: &OAuth2Request,
        provider: &dyn ProviderSettings,
        client: &ClientRegistration,
        refresh_token: &RefreshToken,
    ) -> DomainResult<(AccessToken, Option<String>)> {
        if refresh_token.client_id.to_lowercase() != client.client_id.to_lowercase() {
            return Err(OAuth2Error::invalid_request("Token was issued to a different client").into());
        }

        if !refresh_token.is_refresh_grant() || refresh_token.is_expired() {
            return Err(OAuth2Error::invalid_grant("grant is invalid").into());
        }

        let owner = self.resolve_owner(refresh_token).await?;
        debug!(owner = %owner.id, realm = %owner.realm, "Resource owner resolved");

        let requested = split_scope(request.parameter(params::SCOPE));
        let scope = provider
            .validate_refresh_token_scope(client, &requested, &refresh_token.scope, request)
            .await?;

        let claims = provider
            .validate_requested_claims(refresh_token.claims.as_deref())
            .await?;

        let rotated = if provider.issue_refresh_tokens_on_refreshing() {
            let replacement = self
                .store
                .create_refresh_token(NewRefreshToken {
                    grant_type: REFRESH_TOKEN_GRANT.to_string(),
                    client_id: client.client_id.clone(),
                    owner: refresh_token.owner.clone(),
                    redirect_uri: refresh_token.redirect_uri.clone(),
                    scope: refresh_token.scope.clone(),
                    claims: claims.clone(),
                    auth_grant_id: refresh_token.auth_grant_id.clone(),
                    lifetime: provider.refresh_token_lifetime(),
                })
                .await?;
            self.store.delete_refresh_token(&refresh_token.id).await?;
            Some(replacement)
        } else {
            None
        };

        let backing_id = rotated
            .as_ref()
            .map_or_else(|| refresh_token.id.clone(), |token| token.id.clone());

        let mut access_token = self
            .store
            .create_access_token(NewAccessToken {
                grant_type: REFRESH_TOKEN_GRANT.to_string(),
                token_type: BEARER.to_string(),
                owner: refresh_token.owner.clone(),
                client_id: client.client_id.clone(),
                redirect_uri: refresh_token.redirect_uri.clone(),
                scope: scope.clone(),
                refresh_token_id: Some(backing_id),
                claims,
                lifetime: provider.access_token_lifetime(),
            })
            .await?;

        if let Some(replacement) = &rotated {
            access_token.add_extra_data(EXTRA_REFRESH_TOKEN, replacement.id.clone());
        }

        provider
            .additional_data_to_return_from_token_endpoint(&mut access_token, request)
            .await?;

        if !scope.is_empty() {
            access_token.add_extra_data(EXTRA_SCOPE, join_scope(&scope));
        }

        Ok((access_token, rotated.map(|token| token.id)))
    }

    /// Not found, inactive and unauthorizable owners are indistinguishable to the caller
    async fn resolve_owner(&self, refresh_token: &RefreshToken) -> DomainResult<Identity> {
        let owner = &refresh_token.owner;
        let identity = match self
            .identities
            .get_resource_owner_identity(&owner.id, &owner.realm)
            .await
        {
            Ok(identity) => identity,
            Err(DomainError::OAuth2(e @ OAuth2Error::UnauthorizedClient { .. })) => {
                debug!(owner = %owner, error = %e, "Unable to resolve resource owner");
                None
            }
            Err(e) => return Err(e),
        };

        identity
            .filter(|identity| identity.active)
            .ok_or_else(|| OAuth2Error::invalid_request(OWNER_INVALID).into())
    }
}
