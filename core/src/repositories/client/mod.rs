//! OAuth2 client registry module.

mod r#trait;
pub use r#trait::ClientRegistry;

mod memory;
pub use memory::InMemoryClientRegistry;
