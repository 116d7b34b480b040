//! In-memory token store, also serving reaper queries over its records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::r#trait::TokenStore;
use crate::domain::entities::partial_token::PartialToken;
use crate::domain::entities::token::{
    AccessToken, NewAccessToken, NewRefreshToken, OwnerRef, RefreshToken, TokenType,
};
use crate::errors::{CoreTokenError, DomainError, DomainResult};
use crate::repositories::query::{InMemoryReaperQuery, ReaperFilter, ReaperQuery, ReaperQueryFactory};

#[derive(Debug, Clone)]
enum StoredRecord {
    Refresh(RefreshToken),
    Access(AccessToken),
    Partial(PartialToken),
}

impl StoredRecord {
    fn partial(&self) -> PartialToken {
        match self {
            Self::Refresh(token) => {
                PartialToken::new(token.id.clone(), token.token_type, token.expires_at)
            }
            Self::Access(token) => {
                PartialToken::new(token.id.clone(), TokenType::AccessToken, token.expires_at)
            }
            Self::Partial(partial) => partial.clone(),
        }
    }

    /// The record read through the refresh token projection, keeping its kind
    ///
    /// Bare partial records carry no owner or client, those columns read as empty.
    fn as_refresh_token(&self) -> RefreshToken {
        match self {
            Self::Refresh(token) => token.clone(),
            Self::Access(token) => RefreshToken {
                id: token.id.clone(),
                token_type: TokenType::AccessToken,
                grant_type: token.grant_type.clone(),
                owner: token.owner.clone(),
                client_id: token.client_id.clone(),
                scope: token.scope.clone(),
                redirect_uri: token.redirect_uri.clone(),
                claims: token.claims.clone(),
                auth_grant_id: None,
                audit_tracking_id: token.audit_tracking_id.clone(),
                expires_at: token.expires_at,
                created_at: token.created_at,
            },
            Self::Partial(partial) => RefreshToken {
                id: partial.id.clone(),
                token_type: partial.token_type,
                grant_type: String::new(),
                owner: OwnerRef::new("", ""),
                client_id: String::new(),
                scope: BTreeSet::new(),
                redirect_uri: None,
                claims: None,
                auth_grant_id: None,
                audit_tracking_id: String::new(),
                expires_at: partial.expires_at,
                created_at: partial.expires_at,
            },
        }
    }
}

/// Token store keeping every record in memory
///
/// Failure injection knobs let tests exercise per-record failures, hung
/// deletes, store outages and cursor failures.
#[derive(Clone, Default)]
pub struct InMemoryTokenStore {
    records: Arc<RwLock<HashMap<String, StoredRecord>>>,
    failing_deletes: Arc<RwLock<HashSet<String>>>,
    unavailable: Arc<AtomicBool>,
    delete_delay_ms: Arc<AtomicU64>,
    fail_query_at_page: Arc<AtomicUsize>,
    delete_calls: Arc<AtomicUsize>,
    queries_opened: Arc<AtomicUsize>,
    query_closes: Arc<AtomicUsize>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a refresh token record as-is
    pub async fn insert_refresh_token(&self, token: RefreshToken) {
        self.records
            .write()
            .await
            .insert(token.id.clone(), StoredRecord::Refresh(token));
    }

    /// Store a bare record known only by its partial projection, e.g. a session
    pub async fn insert_partial(&self, partial: PartialToken) {
        self.records
            .write()
            .await
            .insert(partial.id.clone(), StoredRecord::Partial(partial));
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.records.read().await.contains_key(id)
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Make every operation fail as if the backing store were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make deletes of `id` fail with a per-record error
    pub async fn fail_deletes_for(&self, id: impl Into<String>) {
        self.failing_deletes.write().await.insert(id.into());
    }

    /// Delay every delete, simulating a hung persistence call
    pub fn set_delete_delay(&self, delay: Duration) {
        self.delete_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Make queries opened from now on fail when page `page` (1-based) is read
    pub fn fail_query_at_page(&self, page: usize) {
        self.fail_query_at_page.store(page, Ordering::SeqCst);
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn queries_opened(&self) -> usize {
        self.queries_opened.load(Ordering::SeqCst)
    }

    pub fn query_closes(&self) -> usize {
        self.query_closes.load(Ordering::SeqCst)
    }

    fn ensure_available(&self) -> DomainResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CoreTokenError::StoreUnavailable {
                message: "in-memory token store is marked unavailable".to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn remove(&self, id: &str) -> DomainResult<bool> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()?;

        let delay = self.delete_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        if self.failing_deletes.read().await.contains(id) {
            return Err(DomainError::internal(format!("delete of token {} rejected", id)));
        }

        Ok(self.records.write().await.remove(id).is_some())
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn read_refresh_token(&self, id: &str) -> DomainResult<Option<RefreshToken>> {
        self.ensure_available()?;
        let records = self.records.read().await;
        Ok(records.get(id).map(StoredRecord::as_refresh_token))
    }

    async fn create_refresh_token(&self, token: NewRefreshToken) -> DomainResult<RefreshToken> {
        self.ensure_available()?;
        let token = token.into_token(Utc::now());
        self.insert_refresh_token(token.clone()).await;
        Ok(token)
    }

    async fn delete_refresh_token(&self, id: &str) -> DomainResult<bool> {
        self.remove(id).await
    }

    async fn create_access_token(&self, token: NewAccessToken) -> DomainResult<AccessToken> {
        self.ensure_available()?;
        let token = token.into_token(Utc::now());
        self.records
            .write()
            .await
            .insert(token.id.clone(), StoredRecord::Access(token.clone()));
        Ok(token)
    }

    async fn read_access_token(&self, id: &str) -> DomainResult<Option<AccessToken>> {
        self.ensure_available()?;
        let records = self.records.read().await;
        Ok(match records.get(id) {
            Some(StoredRecord::Access(token)) => Some(token.clone()),
            _ => None,
        })
    }

    async fn delete_token(&self, id: &str) -> DomainResult<bool> {
        self.remove(id).await
    }
}

#[async_trait]
impl ReaperQueryFactory for InMemoryTokenStore {
    async fn open(
        &self,
        filter: ReaperFilter,
        cutoff: DateTime<Utc>,
        page_size: usize,
    ) -> DomainResult<Box<dyn ReaperQuery>> {
        self.ensure_available()?;

        let mut matching: Vec<PartialToken> = self
            .records
            .read()
            .await
            .values()
            .map(StoredRecord::partial)
            .filter(|partial| filter.matches(partial, cutoff))
            .collect();
        matching.sort_by(|a, b| a.id.cmp(&b.id));

        self.queries_opened.fetch_add(1, Ordering::SeqCst);
        let mut query = InMemoryReaperQuery::new(matching, page_size)
            .with_close_counter(self.query_closes.clone());
        let fail_at = self.fail_query_at_page.load(Ordering::SeqCst);
        if fail_at > 0 {
            query = query.failing_at(fail_at);
        }
        Ok(Box::new(query))
    }
}
