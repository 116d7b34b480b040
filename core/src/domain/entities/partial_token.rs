//! Minimal token projections used by the reaper.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::token::TokenType;

/// Projection of a stored record carrying just enough to reap it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialToken {
    pub id: String,
    pub token_type: TokenType,
    pub expires_at: DateTime<Utc>,
    pub idle_expires_at: Option<DateTime<Utc>>,
    pub max_session_expires_at: Option<DateTime<Utc>>,
}

impl PartialToken {
    pub fn new(id: impl Into<String>, token_type: TokenType, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            token_type,
            expires_at,
            idle_expires_at: None,
            max_session_expires_at: None,
        }
    }

    pub fn with_idle_expiry(mut self, at: DateTime<Utc>) -> Self {
        self.idle_expires_at = Some(at);
        self
    }

    pub fn with_max_session_expiry(mut self, at: DateTime<Utc>) -> Self {
        self.max_session_expires_at = Some(at);
        self
    }

    pub fn is_session(&self) -> bool {
        self.token_type == TokenType::Session
    }
}

/// Why a record is being reaped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryReason {
    MaxSessionTime,
    IdleTimeout,
    Ttl,
}

impl ExpiryReason {
    /// Classify a record at `now`.
    ///
    /// Max-session expiry wins over idle timeout, which wins over plain TTL
    /// expiry. Non-session records are always `Ttl`.
    pub fn classify(token: &PartialToken, now: DateTime<Utc>) -> Self {
        if !token.is_session() {
            return Self::Ttl;
        }
        if token.max_session_expires_at.is_some_and(|at| at <= now) {
            Self::MaxSessionTime
        } else if token.idle_expires_at.is_some_and(|at| at <= now) {
            Self::IdleTimeout
        } else {
            Self::Ttl
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaxSessionTime => "max_session_time",
            Self::IdleTimeout => "idle_timeout",
            Self::Ttl => "ttl",
        }
    }
}

/// Reaping lifecycle of one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReapState {
    Active,
    PendingReap,
    /// Terminal: the record is gone from the store
    Reaped,
    /// Terminal: the record stays in the store for the next cycle
    ReapFailed,
}

impl ReapState {
    pub fn can_transition_to(&self, next: ReapState) -> bool {
        matches!(
            (self, next),
            (Self::Active, Self::PendingReap)
                | (Self::PendingReap, Self::Reaped)
                | (Self::PendingReap, Self::ReapFailed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Reaped | Self::ReapFailed)
    }
}

/// One page of partial tokens, consumed exactly once by a batch handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// 1-based page number within the run
    pub page: usize,
    tokens: Vec<PartialToken>,
}

impl Batch {
    pub fn new(page: usize, tokens: Vec<PartialToken>) -> Self {
        Self { page, tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PartialToken> {
        self.tokens.iter()
    }

    pub fn into_tokens(self) -> Vec<PartialToken> {
        self.tokens
    }
}
