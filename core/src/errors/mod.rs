//! Domain-specific error types and error handling.

mod types;

pub use types::{CoreTokenError, OAuth2Error};

use thiserror::Error;

/// Core domain errors crossing every collaborator seam
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    OAuth2(#[from] OAuth2Error),

    #[error(transparent)]
    CoreToken(#[from] CoreTokenError),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the error means the backing store cannot serve requests at all,
    /// as opposed to a failure scoped to a single record
    pub fn is_systemic(&self) -> bool {
        matches!(
            self,
            DomainError::CoreToken(CoreTokenError::StoreUnavailable { .. })
                | DomainError::CoreToken(CoreTokenError::Query { .. })
                | DomainError::CoreToken(CoreTokenError::CursorClosed)
        )
    }
}

/// Anything that is not already an OAuth2 error surfaces as `server_error`
impl From<DomainError> for OAuth2Error {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::OAuth2(e) => e,
            other => OAuth2Error::server(other.to_string()),
        }
    }
}
