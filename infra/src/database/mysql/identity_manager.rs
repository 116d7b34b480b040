//! Resource owner lookups against `cts_resource_owners`.

use async_trait::async_trait;
use sqlx::MySqlPool;

use cts_core::domain::entities::identity::Identity;
use cts_core::errors::{DomainError, DomainResult, OAuth2Error};
use cts_core::repositories::identity::IdentityManager;

use crate::InfrastructureError;

/// Stored state of a resource owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerStatus {
    Active,
    Inactive,
    /// The owner exists but may not be authorized
    Locked,
}

impl OwnerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Locked => "locked",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "locked" => Some(Self::Locked),
            _ => None,
        }
    }

    /// Map a stored status to the identity manager contract
    pub fn resolve(self, owner_id: &str, realm: &str) -> DomainResult<Option<Identity>> {
        match self {
            Self::Active => Ok(Some(Identity::active(owner_id, realm))),
            Self::Inactive => Ok(None),
            Self::Locked => Err(OAuth2Error::unauthorized_client(format!(
                "identity {}@{} is locked",
                owner_id, realm
            ))
            .into()),
        }
    }
}

/// MySQL implementation of IdentityManager
#[derive(Clone)]
pub struct MySqlIdentityManager {
    pool: MySqlPool,
}

impl MySqlIdentityManager {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityManager for MySqlIdentityManager {
    async fn get_resource_owner_identity(
        &self,
        owner_id: &str,
        realm: &str,
    ) -> DomainResult<Option<Identity>> {
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM cts_resource_owners WHERE id = ? AND realm = ?")
                .bind(owner_id)
                .bind(realm)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DomainError::from(InfrastructureError::Database(e)))?;

        let Some(status) = status else {
            return Ok(None);
        };

        OwnerStatus::parse(&status)
            .ok_or_else(|| {
                DomainError::from(InfrastructureError::decode(format!(
                    "owner {}@{} has unknown status '{}'",
                    owner_id, realm, status
                )))
            })?
            .resolve(owner_id, realm)
    }
}
