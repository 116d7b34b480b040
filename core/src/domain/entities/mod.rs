//! Domain entities representing tokens, sessions and their owners.

pub mod audit;
pub mod client;
pub mod identity;
pub mod partial_token;
pub mod token;

// Re-export commonly used types
pub use audit::{AuditEventType, AuditLog};
pub use client::ClientRegistration;
pub use identity::Identity;
pub use partial_token::{Batch, ExpiryReason, PartialToken, ReapState};
pub use token::{
    generate_token_id, AccessToken, NewAccessToken, NewRefreshToken, OwnerRef, RefreshToken,
    TokenType, BEARER, REFRESH_TOKEN_GRANT,
};
