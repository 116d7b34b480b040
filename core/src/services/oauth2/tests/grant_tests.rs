use super::*;
use crate::errors::OAuth2Error;

#[tokio::test]
async fn test_refresh_grant_dispatched() {
    let fixture = Fixture::new(true).await;
    let token = fixture.issue(&["read"]).await;
    let service = AccessTokenService::with_refresh_token_grant(Arc::new(fixture.exchange()));

    assert!(service.supports(REFRESH_TOKEN_GRANT));
    let access = service
        .request_access_token(&refresh_request(&token.id))
        .await
        .unwrap();
    assert!(access.extra_data.contains_key(EXTRA_REFRESH_TOKEN));
}

#[tokio::test]
async fn test_missing_grant_type() {
    let fixture = Fixture::new(true).await;
    let service = AccessTokenService::with_refresh_token_grant(Arc::new(fixture.exchange()));
    let request = OAuth2Request::new(REALM).with_parameter(params::REFRESH_TOKEN, "abc");

    let err = service.request_access_token(&request).await.unwrap_err();

    assert!(matches!(err, OAuth2Error::InvalidRequest { .. }));
}

#[tokio::test]
async fn test_unknown_grant_type() {
    let fixture = Fixture::new(true).await;
    let service = AccessTokenService::with_refresh_token_grant(Arc::new(fixture.exchange()));
    let request = OAuth2Request::new(REALM).with_parameter(params::GRANT_TYPE, "password");

    let err = service.request_access_token(&request).await.unwrap_err();

    assert!(matches!(err, OAuth2Error::UnsupportedGrantType { .. }));
    assert_eq!(err.error_code(), "unsupported_grant_type");
}

#[tokio::test]
async fn test_empty_service_supports_nothing() {
    let service = AccessTokenService::new();
    let request = OAuth2Request::new(REALM).with_parameter(params::GRANT_TYPE, REFRESH_TOKEN_GRANT);

    assert!(!service.supports(REFRESH_TOKEN_GRANT));
    assert!(service.request_access_token(&request).await.is_err());
}
