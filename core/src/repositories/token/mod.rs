//! Token store module.

mod r#trait;
pub use r#trait::TokenStore;

mod memory;
pub use memory::InMemoryTokenStore;
