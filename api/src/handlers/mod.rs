//! HTTP handlers.

pub mod credentials;
pub mod error;
pub mod health;
pub mod token;

pub use error::oauth2_error_response;
pub use health::health_check;
pub use token::token_endpoint;
