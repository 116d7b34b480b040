//! Value objects representing immutable request concepts.

pub mod request;
pub mod scope;

// Re-export commonly used types
pub use request::{params, ClientCredentials, OAuth2Request};
pub use scope::{join_scope, split_scope};
