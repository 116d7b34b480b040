//! OAuth2 and core token error enums bridged by [`DomainError`](super::DomainError)

use cts_shared::{error_codes, OAuth2ErrorResponse};
use thiserror::Error;

/// Errors in the OAuth2 token-endpoint vocabulary
///
/// Every variant carries a human-readable description which is returned to
/// the caller verbatim as `error_description`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OAuth2Error {
    #[error("invalid_request: {description}")]
    InvalidRequest { description: String },

    #[error("invalid_client: {description}")]
    InvalidClient { description: String },

    #[error("invalid_grant: {description}")]
    InvalidGrant { description: String },

    #[error("unauthorized_client: {description}")]
    UnauthorizedClient { description: String },

    #[error("unsupported_grant_type: {description}")]
    UnsupportedGrantType { description: String },

    #[error("invalid_scope: {description}")]
    InvalidScope { description: String },

    #[error("server_error: {description}")]
    Server { description: String },
}

impl OAuth2Error {
    pub fn invalid_request(description: impl Into<String>) -> Self {
        Self::InvalidRequest {
            description: description.into(),
        }
    }

    pub fn invalid_client(description: impl Into<String>) -> Self {
        Self::InvalidClient {
            description: description.into(),
        }
    }

    pub fn invalid_grant(description: impl Into<String>) -> Self {
        Self::InvalidGrant {
            description: description.into(),
        }
    }

    pub fn unauthorized_client(description: impl Into<String>) -> Self {
        Self::UnauthorizedClient {
            description: description.into(),
        }
    }

    pub fn unsupported_grant_type(description: impl Into<String>) -> Self {
        Self::UnsupportedGrantType {
            description: description.into(),
        }
    }

    pub fn invalid_scope(description: impl Into<String>) -> Self {
        Self::InvalidScope {
            description: description.into(),
        }
    }

    pub fn server(description: impl Into<String>) -> Self {
        Self::Server {
            description: description.into(),
        }
    }

    /// RFC 6749 `error` code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => error_codes::INVALID_REQUEST,
            Self::InvalidClient { .. } => error_codes::INVALID_CLIENT,
            Self::InvalidGrant { .. } => error_codes::INVALID_GRANT,
            Self::UnauthorizedClient { .. } => error_codes::UNAUTHORIZED_CLIENT,
            Self::UnsupportedGrantType { .. } => error_codes::UNSUPPORTED_GRANT_TYPE,
            Self::InvalidScope { .. } => error_codes::INVALID_SCOPE,
            Self::Server { .. } => error_codes::SERVER_ERROR,
        }
    }

    /// HTTP status the token endpoint answers with
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidClient { .. } => 401,
            Self::Server { .. } => 500,
            _ => 400,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::InvalidRequest { description }
            | Self::InvalidClient { description }
            | Self::InvalidGrant { description }
            | Self::UnauthorizedClient { description }
            | Self::UnsupportedGrantType { description }
            | Self::InvalidScope { description }
            | Self::Server { description } => description,
        }
    }

    pub fn to_response(&self) -> OAuth2ErrorResponse {
        OAuth2ErrorResponse::new(self.error_code(), self.description())
    }
}

/// Errors raised by the reaping machinery and the token store behind it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreTokenError {
    #[error("Reaper query failed: {message}")]
    Query { message: String },

    #[error("Reaper query cursor is closed")]
    CursorClosed,

    #[error("Token store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Deleting token {token_id} timed out after {timeout_ms} ms")]
    RecordTimeout { token_id: String, timeout_ms: u64 },

    #[error("A reap run is already in progress")]
    ReapInProgress,

    #[error("Unknown expiry process: {key}")]
    UnknownProcess { key: String },
}
