//! Token endpoint request as seen by the core services.

use std::collections::HashMap;

use cts_shared::config::oauth2::ROOT_REALM;

/// Form parameter names understood by the token endpoint
pub mod params {
    pub const GRANT_TYPE: &str = "grant_type";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    pub const SCOPE: &str = "scope";
    pub const CLIENT_ID: &str = "client_id";
    pub const CLIENT_SECRET: &str = "client_secret";
}

/// Client credentials presented through HTTP Basic authentication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// An incoming OAuth2 token request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuth2Request {
    pub realm: String,
    parameters: HashMap<String, String>,
    basic_credentials: Option<ClientCredentials>,
    rejected_authorization: Option<String>,
}

impl Default for OAuth2Request {
    fn default() -> Self {
        Self::new(ROOT_REALM)
    }
}

impl OAuth2Request {
    pub fn new(realm: impl Into<String>) -> Self {
        Self {
            realm: realm.into(),
            parameters: HashMap::new(),
            basic_credentials: None,
            rejected_authorization: None,
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn with_parameters(mut self, parameters: HashMap<String, String>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    pub fn with_basic_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.basic_credentials = Some(ClientCredentials {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        });
        self
    }

    /// Records an Authorization header that could not be decoded
    ///
    /// Client authentication fails with `reason`; request-shape checks that
    /// run before it still report first.
    pub fn with_rejected_authorization(mut self, reason: impl Into<String>) -> Self {
        self.basic_credentials = None;
        self.rejected_authorization = Some(reason.into());
        self
    }

    pub fn rejected_authorization(&self) -> Option<&str> {
        self.rejected_authorization.as_deref()
    }

    /// Raw parameter value
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Parameter value, treating an empty or blank value as absent
    pub fn non_empty_parameter(&self, name: &str) -> Option<&str> {
        self.parameter(name).filter(|v| !v.trim().is_empty())
    }

    /// Client credentials, preferring HTTP Basic over form parameters
    pub fn client_credentials(&self) -> Option<ClientCredentials> {
        if let Some(credentials) = &self.basic_credentials {
            return Some(credentials.clone());
        }
        let client_id = self.non_empty_parameter(params::CLIENT_ID)?;
        Some(ClientCredentials {
            client_id: client_id.to_string(),
            client_secret: self.parameter(params::CLIENT_SECRET).unwrap_or_default().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_parameter_is_absent() {
        let request = OAuth2Request::default().with_parameter(params::REFRESH_TOKEN, "  ");
        assert_eq!(request.parameter(params::REFRESH_TOKEN), Some("  "));
        assert_eq!(request.non_empty_parameter(params::REFRESH_TOKEN), None);
        assert_eq!(request.realm, "/");
    }

    #[test]
    fn test_basic_credentials_take_precedence() {
        let request = OAuth2Request::new("/")
            .with_parameter(params::CLIENT_ID, "form-client")
            .with_parameter(params::CLIENT_SECRET, "form-secret")
            .with_basic_credentials("basic-client", "basic-secret");
        let credentials = request.client_credentials().unwrap();
        assert_eq!(credentials.client_id, "basic-client");
        assert_eq!(credentials.client_secret, "basic-secret");
    }

    #[test]
    fn test_rejected_authorization_is_kept_for_client_auth() {
        let request = OAuth2Request::new("/")
            .with_basic_credentials("basic-client", "basic-secret")
            .with_rejected_authorization("Malformed Basic credentials");
        assert_eq!(request.rejected_authorization(), Some("Malformed Basic credentials"));
        assert!(request.client_credentials().is_none());
    }

    #[test]
    fn test_form_credentials() {
        let request = OAuth2Request::new("/").with_parameter(params::CLIENT_ID, "public");
        let credentials = request.client_credentials().unwrap();
        assert_eq!(credentials.client_id, "public");
        assert_eq!(credentials.client_secret, "");

        assert!(OAuth2Request::new("/").client_credentials().is_none());
    }
}
