//! Paged reaper query module.

mod r#trait;
pub use r#trait::{ReaperFilter, ReaperQuery, ReaperQueryFactory};

mod memory;
pub use memory::InMemoryReaperQuery;
