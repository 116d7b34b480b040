//! Token endpoint handler.

use actix_web::http::header::{self, CacheControl, CacheDirective};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use tracing::debug;

use cts_core::domain::value_objects::request::OAuth2Request;

use super::credentials::basic_credentials;
use super::error::oauth2_error_response;
use crate::dto::{RealmQuery, TokenForm};
use crate::state::AppState;

/// Handler for `POST {token_endpoint_path}`
///
/// Accepts an `application/x-www-form-urlencoded` token request with client
/// credentials either in the form or as HTTP Basic authentication. An
/// undecodable Authorization header fails client authentication, after the
/// request-shape checks.
///
/// ## Success (200 OK)
/// ```json
/// {
///     "access_token": "...",
///     "token_type": "Bearer",
///     "expires_in": 3600,
///     "refresh_token": "...",
///     "scope": "read write"
/// }
/// ```
///
/// ## Errors
/// RFC 6749 error bodies: 400 for request, grant and scope errors, 401 for
/// client authentication failures and 500 for server errors.
pub async fn token_endpoint(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<RealmQuery>,
    form: web::Form<TokenForm>,
) -> HttpResponse {
    let mut request = OAuth2Request::new(query.realm()).with_parameters(form.into_inner());

    match basic_credentials(req.headers()) {
        Ok(Some((client_id, client_secret))) => {
            request = request.with_basic_credentials(client_id, client_secret);
        }
        Ok(None) => {}
        Err(err) => {
            request = request.with_rejected_authorization(err.description());
        }
    }

    debug!(realm = %request.realm, "Token request received");

    match state.token_service.request_access_token(&request).await {
        Ok(access_token) => HttpResponse::Ok()
            .insert_header(CacheControl(vec![CacheDirective::NoStore]))
            .insert_header((header::PRAGMA, "no-cache"))
            .json(access_token.to_response_map(Utc::now())),
        Err(err) => oauth2_error_response(&err),
    }
}
