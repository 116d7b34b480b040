use super::*;
use crate::errors::{DomainError, OAuth2Error};

async fn authenticator() -> SecretClientAuthenticator {
    let registry = InMemoryClientRegistry::new();
    registry
        .register(ClientRegistration::new(CLIENT_ID, CLIENT_SECRET, REALM))
        .await;
    SecretClientAuthenticator::new(Arc::new(registry))
}

fn is_invalid_client(result: Result<ClientRegistration, DomainError>) -> bool {
    matches!(
        result,
        Err(DomainError::OAuth2(OAuth2Error::InvalidClient { .. }))
    )
}

#[tokio::test]
async fn test_basic_and_form_credentials() {
    let auth = authenticator().await;

    let basic = OAuth2Request::new(REALM).with_basic_credentials(CLIENT_ID, CLIENT_SECRET);
    assert_eq!(
        auth.authenticate(&basic, "/token").await.unwrap().client_id,
        CLIENT_ID
    );

    let form = OAuth2Request::new(REALM)
        .with_parameter(params::CLIENT_ID, CLIENT_ID)
        .with_parameter(params::CLIENT_SECRET, CLIENT_SECRET);
    assert!(auth.authenticate(&form, "/token").await.is_ok());
}

#[tokio::test]
async fn test_rejections() {
    let auth = authenticator().await;

    let none = OAuth2Request::new(REALM);
    assert!(is_invalid_client(auth.authenticate(&none, "/token").await));

    let wrong_secret = OAuth2Request::new(REALM).with_basic_credentials(CLIENT_ID, "nope");
    assert!(is_invalid_client(auth.authenticate(&wrong_secret, "/token").await));

    let unknown = OAuth2Request::new(REALM).with_basic_credentials("intruder", CLIENT_SECRET);
    assert!(is_invalid_client(auth.authenticate(&unknown, "/token").await));

    let wrong_realm =
        OAuth2Request::new("/partners").with_basic_credentials(CLIENT_ID, CLIENT_SECRET);
    assert!(is_invalid_client(auth.authenticate(&wrong_realm, "/token").await));
}

#[tokio::test]
async fn test_rejected_authorization_header_ignores_form_credentials() {
    let auth = authenticator().await;

    let request = OAuth2Request::new(REALM)
        .with_parameter(params::CLIENT_ID, CLIENT_ID)
        .with_parameter(params::CLIENT_SECRET, CLIENT_SECRET)
        .with_rejected_authorization("Malformed Basic credentials");

    match auth.authenticate(&request, "/token").await {
        Err(DomainError::OAuth2(OAuth2Error::InvalidClient { description })) => {
            assert_eq!(description, "Malformed Basic credentials");
        }
        other => panic!("expected invalid_client, got {:?}", other.map(|c| c.client_id)),
    }
}
