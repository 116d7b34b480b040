//! Keyset-paged reaper queries over `cts_tokens`.
//!
//! Pages are read with `WHERE <expiry column> <= cutoff AND id > last_id
//! ORDER BY id LIMIT page_size`, so rows deleted by the previous page are
//! never re-read and no row is skipped.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use tracing::debug;

use cts_core::domain::entities::partial_token::PartialToken;
use cts_core::domain::entities::token::TokenType;
use cts_core::errors::{CoreTokenError, DomainResult};
use cts_core::repositories::query::{ReaperFilter, ReaperQuery};

use crate::InfrastructureError;

/// Keyset paging state of one reaper query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeysetPage {
    filter: ReaperFilter,
    cutoff: DateTime<Utc>,
    page_size: usize,
    last_id: Option<String>,
    exhausted: bool,
}

impl KeysetPage {
    pub fn new(filter: ReaperFilter, cutoff: DateTime<Utc>, page_size: usize) -> Self {
        Self {
            filter,
            cutoff,
            page_size: page_size.max(1),
            last_id: None,
            exhausted: false,
        }
    }

    /// Column compared against the cutoff
    pub fn expiry_column(filter: ReaperFilter) -> &'static str {
        match filter {
            ReaperFilter::ExpiredTokens => "expires_at",
            ReaperFilter::MaxSessionTimeExpired => "max_session_expires_at",
            ReaperFilter::IdleTimeoutExpired => "idle_expires_at",
        }
    }

    /// SQL for the next page; binds are cutoff, then last id if any, then limit
    pub fn sql(&self) -> String {
        let mut sql = format!(
            "SELECT id, token_type, expires_at, idle_expires_at, max_session_expires_at \
             FROM cts_tokens WHERE {} <= ?",
            Self::expiry_column(self.filter)
        );
        if self.filter != ReaperFilter::ExpiredTokens {
            sql.push_str(" AND token_type = 'session'");
        }
        if self.last_id.is_some() {
            sql.push_str(" AND id > ?");
        }
        sql.push_str(" ORDER BY id LIMIT ?");
        sql
    }

    /// Record a page just read; a short page means the query is exhausted
    pub fn advance(&mut self, page: &[PartialToken]) {
        if page.len() < self.page_size {
            self.exhausted = true;
        }
        if let Some(last) = page.last() {
            self.last_id = Some(last.id.clone());
        }
    }

    pub fn cutoff(&self) -> DateTime<Utc> {
        self.cutoff
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn last_id(&self) -> Option<&str> {
        self.last_id.as_deref()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

/// Decode the partial projection selected by [`KeysetPage::sql`]
pub(crate) fn decode_partial(row: &MySqlRow) -> Result<PartialToken, InfrastructureError> {
    let id: String = row.try_get("id")?;
    let token_type: String = row.try_get("token_type")?;
    let token_type = TokenType::parse(&token_type).ok_or_else(|| {
        InfrastructureError::decode(format!("token {} has unknown token_type '{}'", id, token_type))
    })?;

    Ok(PartialToken {
        id,
        token_type,
        expires_at: row.try_get("expires_at")?,
        idle_expires_at: row.try_get("idle_expires_at")?,
        max_session_expires_at: row.try_get("max_session_expires_at")?,
    })
}

fn query_error(e: impl std::fmt::Display) -> CoreTokenError {
    CoreTokenError::Query {
        message: e.to_string(),
    }
}

/// Reaper query reading one keyset page per call
pub struct MySqlReaperQuery {
    pool: MySqlPool,
    page: KeysetPage,
    closed: bool,
}

impl MySqlReaperQuery {
    pub fn new(pool: MySqlPool, page: KeysetPage) -> Self {
        Self {
            pool,
            page,
            closed: false,
        }
    }
}

#[async_trait]
impl ReaperQuery for MySqlReaperQuery {
    async fn next_page(&mut self) -> DomainResult<Option<Vec<PartialToken>>> {
        if self.closed {
            return Err(CoreTokenError::CursorClosed.into());
        }
        if self.page.is_exhausted() {
            return Ok(None);
        }

        let sql = self.page.sql();
        let mut query = sqlx::query(&sql).bind(self.page.cutoff());
        if let Some(last_id) = self.page.last_id() {
            query = query.bind(last_id.to_string());
        }
        let rows = query
            .bind(self.page.page_size() as u64)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;

        let tokens = rows
            .iter()
            .map(decode_partial)
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_error)?;

        self.page.advance(&tokens);
        debug!(
            rows = tokens.len(),
            exhausted = self.page.is_exhausted(),
            "Read reaper page"
        );

        Ok((!tokens.is_empty()).then_some(tokens))
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
