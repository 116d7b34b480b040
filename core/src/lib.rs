//! # CTS Core
//!
//! Core token lifecycle engine for the core token service.
//! This crate contains the domain entities, error types, collaborator traits
//! and the two services built on them:
//! - the paged, batched reaper that purges expired sessions and tokens
//! - the OAuth2 refresh token exchange with optional refresh token rotation

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
