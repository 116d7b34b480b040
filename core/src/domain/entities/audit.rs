//! Audit log entity for session terminations and refresh token exchanges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::token::OwnerRef;

/// Audited token lifecycle events
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEventType {
    // Session termination events
    SessionMaxTimedOut,
    SessionIdleTimedOut,
    SessionExpired,

    // Reaper events
    TokenReaped,

    // Refresh token events
    RefreshTokenSuccess,
    RefreshTokenRotated,
    RefreshTokenFailure,
}

impl AuditEventType {
    /// Convert to string representation for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SessionMaxTimedOut => "SESSION_MAX_TIMED_OUT",
            Self::SessionIdleTimedOut => "SESSION_IDLE_TIMED_OUT",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::TokenReaped => "TOKEN_REAPED",
            Self::RefreshTokenSuccess => "REFRESH_TOKEN_SUCCESS",
            Self::RefreshTokenRotated => "REFRESH_TOKEN_ROTATED",
            Self::RefreshTokenFailure => "REFRESH_TOKEN_FAILURE",
        }
    }

    /// Parse from string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SESSION_MAX_TIMED_OUT" => Some(Self::SessionMaxTimedOut),
            "SESSION_IDLE_TIMED_OUT" => Some(Self::SessionIdleTimedOut),
            "SESSION_EXPIRED" => Some(Self::SessionExpired),
            "TOKEN_REAPED" => Some(Self::TokenReaped),
            "REFRESH_TOKEN_SUCCESS" => Some(Self::RefreshTokenSuccess),
            "REFRESH_TOKEN_ROTATED" => Some(Self::RefreshTokenRotated),
            "REFRESH_TOKEN_FAILURE" => Some(Self::RefreshTokenFailure),
            _ => None,
        }
    }
}

/// An audit log entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditLog {
    /// Unique identifier for the log entry
    pub id: Uuid,

    /// Type of event
    pub event_type: AuditEventType,

    /// Token the event concerns
    pub token_id: Option<String>,

    /// Client involved, for refresh events
    pub client_id: Option<String>,

    /// Resource owner id
    pub owner_id: Option<String>,

    /// Realm of the resource owner
    pub realm: Option<String>,

    /// Audit tracking id correlating the event with the token's history
    pub tracking_id: Option<String>,

    /// Additional event data in JSON format
    pub event_data: Option<JsonValue>,

    /// Timestamp when the event occurred
    pub created_at: DateTime<Utc>,
}

impl AuditLog {
    pub fn new(event_type: AuditEventType) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            token_id: None,
            client_id: None,
            owner_id: None,
            realm: None,
            tracking_id: None,
            event_data: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_token(mut self, token_id: impl Into<String>) -> Self {
        self.token_id = Some(token_id.into());
        self
    }

    pub fn with_client(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_owner(mut self, owner: &OwnerRef) -> Self {
        self.owner_id = Some(owner.id.clone());
        self.realm = Some(owner.realm.clone());
        self
    }

    pub fn with_tracking_id(mut self, tracking_id: impl Into<String>) -> Self {
        self.tracking_id = Some(tracking_id.into());
        self
    }

    pub fn with_event_data(mut self, data: JsonValue) -> Self {
        self.event_data = Some(data);
        self
    }
}
