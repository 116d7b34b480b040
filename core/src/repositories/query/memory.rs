//! In-memory reaper query over a snapshot of partial tokens.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::ReaperQuery;
use crate::domain::entities::partial_token::PartialToken;
use crate::errors::{CoreTokenError, DomainResult};

/// Reaper query paging through a fixed list of partial tokens
pub struct InMemoryReaperQuery {
    remaining: VecDeque<PartialToken>,
    page_size: usize,
    pages_read: usize,
    fail_at_page: Option<usize>,
    exhausted: bool,
    closed: bool,
    close_counter: Arc<AtomicUsize>,
}

impl InMemoryReaperQuery {
    pub fn new(tokens: Vec<PartialToken>, page_size: usize) -> Self {
        Self {
            remaining: tokens.into(),
            page_size: page_size.max(1),
            pages_read: 0,
            fail_at_page: None,
            exhausted: false,
            closed: false,
            close_counter: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail with a query error when page `page` (1-based) is requested
    pub fn failing_at(mut self, page: usize) -> Self {
        self.fail_at_page = Some(page);
        self
    }

    /// Count closes into a shared counter
    pub fn with_close_counter(mut self, counter: Arc<AtomicUsize>) -> Self {
        self.close_counter = counter;
        self
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[async_trait]
impl ReaperQuery for InMemoryReaperQuery {
    async fn next_page(&mut self) -> DomainResult<Option<Vec<PartialToken>>> {
        if self.closed {
            return Err(CoreTokenError::CursorClosed.into());
        }
        if self.exhausted {
            return Ok(None);
        }

        let page_number = self.pages_read + 1;
        if self.fail_at_page == Some(page_number) {
            return Err(CoreTokenError::Query {
                message: format!("simulated failure reading page {}", page_number),
            }
            .into());
        }

        let take = self.page_size.min(self.remaining.len());
        let page: Vec<PartialToken> = self.remaining.drain(..take).collect();
        if page.is_empty() {
            self.exhausted = true;
            return Ok(None);
        }

        self.pages_read = page_number;
        Ok(Some(page))
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.remaining.clear();
            self.close_counter.fetch_add(1, Ordering::SeqCst);
        }
    }
}
