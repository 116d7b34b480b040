//! # CTS API
//!
//! HTTP surface of the core token service: the OAuth2 token endpoint, the
//! health check and the tracing setup shared by the binary.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use app::configure_app;
pub use state::AppState;
