//! Paged batch reaper.

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::debug;

use super::process::{ExpiryProcess, ReapStats};
use crate::domain::entities::partial_token::{Batch, PartialToken};
use crate::errors::{CoreTokenError, DomainResult};
use crate::repositories::query::{ReaperQuery, ReaperQueryFactory};

/// Closes its query exactly once, on the success path, the error path, or
/// when the run future is dropped
struct CursorGuard {
    query: Box<dyn ReaperQuery>,
    closed: bool,
}

impl CursorGuard {
    fn new(query: Box<dyn ReaperQuery>) -> Self {
        Self {
            query,
            closed: false,
        }
    }

    async fn next_page(&mut self) -> DomainResult<Option<Vec<PartialToken>>> {
        self.query.next_page().await
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.query.close();
        }
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        self.close();
    }
}

/// Drives one [`ExpiryProcess`] over the pages of a reaper query
///
/// Pages are processed strictly one after another: the next page is only
/// requested once every record of the current page has signalled completion.
/// Records within a page are handled concurrently by the process.
pub struct BatchReaper {
    queries: Arc<dyn ReaperQueryFactory>,
    process: Arc<dyn ExpiryProcess>,
    page_size: usize,
    running: Mutex<()>,
}

impl BatchReaper {
    pub fn new(
        queries: Arc<dyn ReaperQueryFactory>,
        process: Arc<dyn ExpiryProcess>,
        page_size: usize,
    ) -> Self {
        Self {
            queries,
            process,
            page_size: page_size.max(1),
            running: Mutex::new(()),
        }
    }

    pub fn process_name(&self) -> &str {
        self.process.name()
    }

    /// Run one reap cycle
    ///
    /// # Returns
    /// * `Ok(ReapStats)` - Every page was read; per-record failures are
    ///   counted in `failed` and left for the next cycle
    /// * `Err(CoreTokenError::ReapInProgress)` - Another run of this reaper
    ///   is active
    /// * `Err(_)` - The query failed or the store became unavailable; no
    ///   further pages were read
    pub async fn run(&self) -> DomainResult<ReapStats> {
        let _running = self
            .running
            .try_lock()
            .map_err(|_| CoreTokenError::ReapInProgress)?;

        let started = Instant::now();
        let cutoff = Utc::now();
        let mut stats = ReapStats::default();

        debug!(
            process = self.process.name(),
            filter = self.process.filter().as_str(),
            %cutoff,
            page_size = self.page_size,
            "Starting reap run"
        );

        let opened = Instant::now();
        let query = self
            .queries
            .open(self.process.filter(), cutoff, self.page_size)
            .await;
        stats.query_time += opened.elapsed();

        let outcome = match query {
            Ok(query) => {
                let mut cursor = CursorGuard::new(query);
                let outcome = self.drain(&mut cursor, &mut stats).await;
                cursor.close();
                outcome
            }
            Err(e) => Err(e),
        };

        stats.elapsed = started.elapsed();
        match outcome {
            Ok(()) => {
                self.process.handle_succeeded(&stats);
                Ok(stats)
            }
            Err(e) => {
                self.process.handle_failed(&e, &stats);
                Err(e)
            }
        }
    }

    async fn drain(&self, cursor: &mut CursorGuard, stats: &mut ReapStats) -> DomainResult<()> {
        loop {
            let fetch_started = Instant::now();
            let page = cursor.next_page().await;
            stats.query_time += fetch_started.elapsed();

            let tokens = match page? {
                Some(tokens) if !tokens.is_empty() => tokens,
                _ => return Ok(()),
            };

            stats.pages += 1;
            stats.total += tokens.len();
            debug!(
                process = self.process.name(),
                page = stats.pages,
                size = tokens.len(),
                "Dispatching reap batch"
            );

            let signal = self.process.handle_batch(Batch::new(stats.pages, tokens));
            let wait_started = Instant::now();
            signal.wait().await;
            stats.worker_wait_time += wait_started.elapsed();
            stats.absorb(signal.tally());

            if let Some(error) = signal.tally().systemic_error() {
                return Err(error);
            }
        }
    }
}
