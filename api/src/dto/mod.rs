//! Request and response shapes of the HTTP layer.

pub mod health;
pub mod token;

pub use health::{DatabaseHealth, HealthResponse};
pub use token::{RealmQuery, TokenForm};
