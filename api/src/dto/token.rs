use serde::Deserialize;
use std::collections::HashMap;

use cts_shared::config::oauth2::ROOT_REALM;

/// Form body of a token request; the grant decides which parameters matter
pub type TokenForm = HashMap<String, String>;

/// `?realm=` query parameter of the token endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RealmQuery {
    pub realm: Option<String>,
}

impl RealmQuery {
    /// The requested realm, rooted at `/`
    pub fn realm(&self) -> String {
        match self.realm.as_deref().map(str::trim) {
            None | Some("") => ROOT_REALM.to_string(),
            Some(realm) if realm.starts_with('/') => realm.to_string(),
            Some(realm) => format!("/{}", realm),
        }
    }
}
