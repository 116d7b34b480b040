//! Application factory
//!
//! Registers state, extractor configuration and routes on an Actix-web
//! application. Middleware is added by the caller.

use actix_web::error::InternalError;
use actix_web::{web, HttpResponse};

use cts_core::errors::OAuth2Error;

use crate::handlers::oauth2_error_response;
use crate::routes::configure_routes;
use crate::state::AppState;

/// Configure the application for `state`
pub fn configure_app(cfg: &mut web::ServiceConfig, state: web::Data<AppState>) {
    let token_path = normalise_path(&state.oauth2.token_endpoint_path);

    let form_config = web::FormConfig::default().error_handler(|err, _req| {
        let response = oauth2_error_response(&OAuth2Error::invalid_request(format!(
            "Malformed token request: {}",
            err
        )));
        InternalError::from_response(err, response).into()
    });

    cfg.app_data(state)
        .app_data(form_config)
        .configure(|cfg| configure_routes(cfg, &token_path))
        .default_service(web::route().to(not_found));
}

fn normalise_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "not_found",
        "error_description": "The requested resource was not found"
    }))
}
