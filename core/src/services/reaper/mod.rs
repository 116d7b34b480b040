//! Reaper service module
//!
//! This module purges expired records from the token store:
//! - `BatchReaper` pulls pages from a reaper query and waits for each batch
//! - `SessionExpiryProcess` deletes records concurrently on a bounded pool
//! - `ProcessRegistry` resolves configured process keys at startup
//! - `spawn_reaper_task` runs a reaper on a fixed interval

mod expiry;
mod latch;
mod process;
mod reaper;
mod registry;
mod scheduler;

#[cfg(test)]
mod tests;

pub use expiry::{ExpiryProcessKind, SessionExpiryProcess};
pub use latch::{CompletionGuard, CountDownLatch};
pub use process::{BatchTally, CompletionSignal, ExpiryProcess, ReapStats, RecordOutcome};
pub use reaper::BatchReaper;
pub use registry::{ProcessDependencies, ProcessFactory, ProcessRegistry};
pub use scheduler::{spawn_reaper_task, spawn_reapers};
