//! Batch handler contract and the accounting shared with the reaper.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, error, info};

use super::latch::CountDownLatch;
use crate::domain::entities::partial_token::{Batch, ReapState};
use crate::errors::DomainError;
use crate::repositories::query::ReaperFilter;

/// Result of reaping one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The record was deleted by this run
    Reaped,
    /// The record was already gone, e.g. reaped by another node
    AlreadyGone,
    /// Deleting failed or timed out; the record stays for the next cycle
    Failed,
}

impl RecordOutcome {
    /// Terminal reap state reached by the record
    pub fn state(&self) -> ReapState {
        match self {
            Self::Reaped | Self::AlreadyGone => ReapState::Reaped,
            Self::Failed => ReapState::ReapFailed,
        }
    }
}

/// Per-batch outcome counters, shared by the workers of one batch
#[derive(Debug, Default)]
pub struct BatchTally {
    reaped: AtomicUsize,
    already_gone: AtomicUsize,
    failed: AtomicUsize,
    systemic: OnceLock<DomainError>,
}

impl BatchTally {
    pub fn record(&self, outcome: RecordOutcome) {
        let counter = match outcome {
            RecordOutcome::Reaped => &self.reaped,
            RecordOutcome::AlreadyGone => &self.already_gone,
            RecordOutcome::Failed => &self.failed,
        };
        counter.fetch_add(1, Ordering::AcqRel);
    }

    /// Record a failure that means the store itself is unusable.
    /// The first such error is kept and aborts the run.
    pub fn record_systemic(&self, error: DomainError) {
        self.record(RecordOutcome::Failed);
        let _ = self.systemic.set(error);
    }

    pub fn reaped(&self) -> usize {
        self.reaped.load(Ordering::Acquire)
    }

    pub fn already_gone(&self) -> usize {
        self.already_gone.load(Ordering::Acquire)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Acquire)
    }

    pub fn completed(&self) -> usize {
        self.reaped() + self.already_gone() + self.failed()
    }

    pub fn systemic_error(&self) -> Option<DomainError> {
        self.systemic.get().cloned()
    }
}

/// Handle returned by [`ExpiryProcess::handle_batch`]
///
/// Resolves once every record of the batch has signalled completion.
#[derive(Debug, Clone)]
pub struct CompletionSignal {
    latch: CountDownLatch,
    tally: Arc<BatchTally>,
}

impl CompletionSignal {
    pub fn new(latch: CountDownLatch, tally: Arc<BatchTally>) -> Self {
        Self { latch, tally }
    }

    pub async fn wait(&self) {
        self.latch.wait().await;
    }

    /// Records still outstanding
    pub fn remaining(&self) -> usize {
        self.latch.count()
    }

    pub fn tally(&self) -> &BatchTally {
        &self.tally
    }
}

/// Statistics of one reap run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReapStats {
    pub pages: usize,
    /// Records dispatched to the batch handler
    pub total: usize,
    pub reaped: usize,
    pub already_gone: usize,
    pub failed: usize,
    /// Time spent waiting on the query
    pub query_time: Duration,
    /// Time spent waiting on batch workers
    pub worker_wait_time: Duration,
    pub elapsed: Duration,
}

impl ReapStats {
    pub fn absorb(&mut self, tally: &BatchTally) {
        self.reaped += tally.reaped();
        self.already_gone += tally.already_gone();
        self.failed += tally.failed();
    }
}

/// A pluggable batch handler driven by the reaper
pub trait ExpiryProcess: Send + Sync {
    /// Registry key, also used as the log target field
    fn name(&self) -> &str;

    /// Records this process selects
    fn filter(&self) -> ReaperFilter;

    /// Dispatch work for every record of `batch` and return without waiting.
    ///
    /// The returned signal completes exactly once per record, whether the
    /// record's work succeeded or failed.
    fn handle_batch(&self, batch: Batch) -> CompletionSignal;

    /// Called once after a run read every page
    fn handle_succeeded(&self, stats: &ReapStats) {
        if stats.total == 0 {
            debug!(process = self.name(), "Reap run found nothing to reap");
            return;
        }
        info!(
            process = self.name(),
            pages = stats.pages,
            total = stats.total,
            reaped = stats.reaped,
            already_gone = stats.already_gone,
            failed = stats.failed,
            query_ms = stats.query_time.as_millis() as u64,
            worker_wait_ms = stats.worker_wait_time.as_millis() as u64,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "Reap run completed"
        );
    }

    /// Called once when a run is aborted
    fn handle_failed(&self, error: &DomainError, stats: &ReapStats) {
        error!(
            process = self.name(),
            pages = stats.pages,
            total = stats.total,
            error = %error,
            "Reap run aborted"
        );
    }
}
