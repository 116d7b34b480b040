//! MySQL implementations of the core collaborator traits.

pub mod audit_repository;
pub mod identity_manager;
pub mod reaper_query;
pub mod token_store;


pub use audit_repository::MySqlAuditLogRepository;
pub use identity_manager::{MySqlIdentityManager, OwnerStatus};
pub use reaper_query::{KeysetPage, MySqlReaperQuery};
pub use token_store::{MySqlTokenStore, TokenRecord};
