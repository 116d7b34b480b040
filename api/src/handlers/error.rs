//! OAuth2 error responses.

use actix_web::http::header::{self, CacheControl, CacheDirective};
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use tracing::{error, warn};

use cts_core::errors::OAuth2Error;
use cts_shared::OAuth2ErrorResponse;

const SERVER_ERROR_DESCRIPTION: &str = "The server encountered an unexpected error";

/// Render an OAuth2 error as the token endpoint JSON body
///
/// Server error details are logged, never returned.
pub fn oauth2_error_response(err: &OAuth2Error) -> HttpResponse {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let body = match err {
        OAuth2Error::Server { description } => {
            error!(error = %description, "Token request failed");
            OAuth2ErrorResponse::new(err.error_code(), SERVER_ERROR_DESCRIPTION)
        }
        _ => {
            warn!(error = err.error_code(), description = err.description(), "Token request rejected");
            err.to_response()
        }
    };

    let mut response = HttpResponse::build(status);
    response
        .insert_header(CacheControl(vec![CacheDirective::NoStore]))
        .insert_header((header::PRAGMA, "no-cache"));
    if matches!(err, OAuth2Error::InvalidClient { .. }) {
        response.insert_header((header::WWW_AUTHENTICATE, "Basic"));
    }
    response.json(body)
}
