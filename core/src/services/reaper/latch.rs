//! Fan-out/join primitive used to track completion of a batch.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

struct LatchInner {
    count: AtomicUsize,
    notify: Notify,
}

/// Async countdown latch
///
/// Created with the number of units of work; each unit calls
/// [`count_down`](CountDownLatch::count_down) once, and
/// [`wait`](CountDownLatch::wait) resolves when the count reaches zero.
#[derive(Clone)]
pub struct CountDownLatch {
    inner: Arc<LatchInner>,
}

impl CountDownLatch {
    pub fn new(count: usize) -> Self {
        Self {
            inner: Arc::new(LatchInner {
                count: AtomicUsize::new(count),
                notify: Notify::new(),
            }),
        }
    }

    /// Decrement the count, saturating at zero
    pub fn count_down(&self) {
        let previous = self
            .inner
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| c.checked_sub(1));
        if previous == Ok(1) {
            self.inner.notify.notify_waiters();
        }
    }

    pub fn count(&self) -> usize {
        self.inner.count.load(Ordering::Acquire)
    }

    /// Wait until the count reaches zero
    pub async fn wait(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a count_down racing with us is not lost.
            notified.as_mut().enable();
            if self.count() == 0 {
                return;
            }
            notified.await;
        }
    }
}

impl std::fmt::Debug for CountDownLatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountDownLatch")
            .field("count", &self.count())
            .finish()
    }
}

/// Counts its latch down exactly once, when dropped
///
/// One guard is created per unit of work before any of it is dispatched, so
/// a worker that panics, times out or is never started still releases its
/// share of the latch.
#[derive(Debug)]
pub struct CompletionGuard {
    latch: CountDownLatch,
}

impl CompletionGuard {
    pub fn new(latch: CountDownLatch) -> Self {
        Self { latch }
    }

    /// Signal completion now
    pub fn complete(self) {
        drop(self);
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.latch.count_down();
    }
}
