//! OAuth2 error wire format shared by the API layer and its clients

use serde::{Deserialize, Serialize};

/// Token endpoint error body as defined by RFC 6749 section 5.2
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth2ErrorResponse {
    /// Machine-readable error code, one of [`error_codes`]
    pub error: String,

    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl OAuth2ErrorResponse {
    pub fn new(error: impl Into<String>, description: impl Into<String>) -> Self {
        let description = description.into();
        Self {
            error: error.into(),
            error_description: if description.is_empty() {
                None
            } else {
                Some(description)
            },
        }
    }
}

/// OAuth2 error codes returned by the token endpoint
pub mod error_codes {
    pub const INVALID_REQUEST: &str = "invalid_request";
    pub const INVALID_CLIENT: &str = "invalid_client";
    pub const INVALID_GRANT: &str = "invalid_grant";
    pub const UNAUTHORIZED_CLIENT: &str = "unauthorized_client";
    pub const UNSUPPORTED_GRANT_TYPE: &str = "unsupported_grant_type";
    pub const INVALID_SCOPE: &str = "invalid_scope";
    pub const SERVER_ERROR: &str = "server_error";
}
