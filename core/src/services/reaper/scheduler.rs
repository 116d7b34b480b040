//! Recurring background execution of reapers.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::process::ExpiryProcess;
use super::reaper::BatchReaper;
use crate::errors::{CoreTokenError, DomainError};
use crate::repositories::query::ReaperQueryFactory;

/// Run `reaper` every `interval` on a background task
///
/// The first run happens one full interval after spawning. A run that
/// outlasts the interval delays the next one rather than overlapping it.
pub fn spawn_reaper_task(reaper: Arc<BatchReaper>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            process = reaper.process_name(),
            interval_secs = interval.as_secs(),
            "Reaper task started"
        );

        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        timer.tick().await;

        loop {
            timer.tick().await;
            match reaper.run().await {
                Ok(_) => {}
                Err(DomainError::CoreToken(CoreTokenError::ReapInProgress)) => {
                    debug!(process = reaper.process_name(), "Previous reap run still active, skipping");
                }
                Err(e) => {
                    warn!(process = reaper.process_name(), error = %e, "Reap run failed, retrying next interval");
                }
            }
        }
    })
}

/// Spawn one reaper task per process
pub fn spawn_reapers(
    queries: Arc<dyn ReaperQueryFactory>,
    processes: Vec<Arc<dyn ExpiryProcess>>,
    page_size: usize,
    interval: Duration,
) -> Vec<JoinHandle<()>> {
    processes
        .into_iter()
        .map(|process| {
            let reaper = Arc::new(BatchReaper::new(queries.clone(), process, page_size));
            spawn_reaper_task(reaper, interval)
        })
        .collect()
}
