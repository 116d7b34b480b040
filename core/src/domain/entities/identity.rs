//! Resource owner identity as seen by the token service.

use serde::{Deserialize, Serialize};

use super::token::OwnerRef;

/// A resolved resource owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub realm: String,
    pub active: bool,
}

impl Identity {
    pub fn active(id: impl Into<String>, realm: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            realm: realm.into(),
            active: true,
        }
    }

    pub fn inactive(id: impl Into<String>, realm: impl Into<String>) -> Self {
        Self {
            active: false,
            ..Self::active(id, realm)
        }
    }

    pub fn owner_ref(&self) -> OwnerRef {
        OwnerRef::new(self.id.clone(), self.realm.clone())
    }
}
