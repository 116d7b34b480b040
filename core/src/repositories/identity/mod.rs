//! Resource owner identity lookup and caching.

mod r#trait;
pub use r#trait::{IdentityCache, IdentityManager};

mod memory;
pub use memory::InMemoryIdentityManager;

mod cache;
pub use cache::TtlCache;

mod cached;
pub use cached::CachedIdentityManager;

#[cfg(test)]
mod tests;
