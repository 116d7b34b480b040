//! Route table.

use actix_web::web;

use crate::handlers::{health_check, token_endpoint};

/// Register the token endpoint at `token_path` and the health check
pub fn configure_routes(cfg: &mut web::ServiceConfig, token_path: &str) {
    cfg.route("/health", web::get().to(health_check))
        .route(token_path, web::post().to(token_endpoint));
}
