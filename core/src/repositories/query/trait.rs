//! Paged query contract driving the reaper.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::partial_token::PartialToken;
use crate::domain::entities::token::TokenType;
use crate::errors::DomainResult;

/// Which records a reaper query selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReaperFilter {
    /// Records of any kind whose TTL expiry is at or before the cutoff
    ExpiredTokens,
    /// Sessions whose max-session expiry is at or before the cutoff
    MaxSessionTimeExpired,
    /// Sessions whose idle expiry is at or before the cutoff
    IdleTimeoutExpired,
}

impl ReaperFilter {
    pub fn matches(&self, token: &PartialToken, cutoff: DateTime<Utc>) -> bool {
        match self {
            Self::ExpiredTokens => token.expires_at <= cutoff,
            Self::MaxSessionTimeExpired => {
                token.token_type == TokenType::Session
                    && token.max_session_expires_at.is_some_and(|at| at <= cutoff)
            }
            Self::IdleTimeoutExpired => {
                token.token_type == TokenType::Session
                    && token.idle_expires_at.is_some_and(|at| at <= cutoff)
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExpiredTokens => "expired_tokens",
            Self::MaxSessionTimeExpired => "max_session_time_expired",
            Self::IdleTimeoutExpired => "idle_timeout_expired",
        }
    }
}

/// A cursor over expired records, read one bounded page at a time
///
/// # Paging convention
/// * `Ok(Some(page))` - a non-empty page. Implementations never yield an
///   empty page; an empty read is reported as exhaustion.
/// * `Ok(None)` - the query is exhausted. Every later call keeps returning
///   `Ok(None)`.
/// * `Err(_)` - the read failed; callers stop pulling from this cursor.
///
/// After [`close`](ReaperQuery::close) every call fails with
/// `CoreTokenError::CursorClosed`.
#[async_trait]
pub trait ReaperQuery: Send {
    /// Fetch the next page of partial tokens
    async fn next_page(&mut self) -> DomainResult<Option<Vec<PartialToken>>>;

    /// Release the underlying cursor resource. Idempotent.
    fn close(&mut self);
}

/// Opens one reaper query per reap run
#[async_trait]
pub trait ReaperQueryFactory: Send + Sync {
    /// Open a query selecting records matching `filter` at `cutoff`
    ///
    /// # Arguments
    /// * `filter` - Which expiry column is compared against the cutoff
    /// * `cutoff` - Records expiring at or before this instant are selected
    /// * `page_size` - Maximum number of records per page
    async fn open(
        &self,
        filter: ReaperFilter,
        cutoff: DateTime<Utc>,
        page_size: usize,
    ) -> DomainResult<Box<dyn ReaperQuery>>;
}
