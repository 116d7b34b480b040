use chrono::{Duration, Utc};
use std::time::Duration as StdDuration;

use super::*;
use crate::domain::entities::audit::AuditEventType;
use crate::domain::entities::token::TokenType;
use crate::errors::OAuth2Error;
use crate::repositories::identity::{CachedIdentityManager, TtlCache};
use crate::repositories::TokenStore;

fn assert_invalid_request(err: &OAuth2Error, expected: &str) {
    match err {
        OAuth2Error::InvalidRequest { description } => assert_eq!(description, expected),
        other => panic!("expected invalid_request, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_refresh_token_rejected_before_client_auth() {
    let fixture = Fixture::new(true).await;
    let request = OAuth2Request::new(REALM)
        .with_parameter(params::GRANT_TYPE, REFRESH_TOKEN_GRANT)
        .with_parameter(params::REFRESH_TOKEN, "")
        .with_basic_credentials(CLIENT_ID, "wrong");

    let err = fixture.exchange().refresh_token(&request).await.unwrap_err();

    assert_invalid_request(&err, "Missing parameter, 'refresh_token'");
}

#[tokio::test]
async fn test_client_authenticated_before_token_lookup() {
    let fixture = Fixture::new(true).await;
    let token = fixture.issue(&["read"]).await;
    fixture.store.set_unavailable(true);

    let request = OAuth2Request::new(REALM)
        .with_parameter(params::REFRESH_TOKEN, token.id.clone())
        .with_basic_credentials(CLIENT_ID, "wrong");
    let err = fixture.exchange().refresh_token(&request).await.unwrap_err();

    // The store was never consulted, otherwise this would be server_error
    assert!(matches!(err, OAuth2Error::InvalidClient { .. }));
    assert_eq!(err.status_code(), 401);
}

#[tokio::test]
async fn test_unknown_refresh_token() {
    let fixture = Fixture::new(true).await;

    let err = fixture
        .exchange()
        .refresh_token(&refresh_request("does-not-exist"))
        .await
        .unwrap_err();

    assert_invalid_request(&err, "RefreshToken does not exist");
    assert!(fixture.audit_repository.entries().await.is_empty());
}

#[tokio::test]
async fn test_no_scope_keeps_original_scope() {
    let fixture = Fixture::new(false).await;
    let token = fixture.issue(&["a", "b", "c"]).await;

    let access = fixture
        .exchange()
        .refresh_token(&refresh_request(&token.id))
        .await
        .unwrap();

    assert_eq!(access.scope, scope_set(&["a", "b", "c"]));
    assert_eq!(access.extra_data.get(EXTRA_SCOPE).unwrap(), "a b c");
    assert_eq!(access.token_type, "Bearer");
    assert_eq!(access.grant_type, REFRESH_TOKEN_GRANT);
    assert_eq!(access.owner, token.owner);
    assert_eq!(access.redirect_uri, token.redirect_uri);
}

#[tokio::test]
async fn test_narrower_scope_is_granted() {
    let fixture = Fixture::new(false).await;
    let token = fixture.issue(&["a", "b", "c"]).await;
    let request = refresh_request(&token.id).with_parameter(params::SCOPE, "b a");

    let access = fixture.exchange().refresh_token(&request).await.unwrap();

    assert_eq!(access.scope, scope_set(&["a", "b"]));
    assert_eq!(access.extra_data.get(EXTRA_SCOPE).unwrap(), "a b");
}

#[tokio::test]
async fn test_wider_scope_rejected_without_issuing() {
    let fixture = Fixture::new(true).await;
    let token = fixture.issue(&["a", "b", "c"]).await;
    let request = refresh_request(&token.id).with_parameter(params::SCOPE, "a d");

    let err = fixture.exchange().refresh_token(&request).await.unwrap_err();

    assert!(matches!(err, OAuth2Error::InvalidScope { .. }));
    // Only the original refresh token is stored: nothing issued, nothing rotated
    assert_eq!(fixture.store.len().await, 1);
    assert!(fixture.store.contains(&token.id).await);
}

#[tokio::test]
async fn test_empty_token_scope_adds_no_scope_data() {
    let fixture = Fixture::new(false).await;
    let token = fixture.issue(&[]).await;

    let access = fixture
        .exchange()
        .refresh_token(&refresh_request(&token.id))
        .await
        .unwrap();

    assert!(access.scope.is_empty());
    assert!(!access.extra_data.contains_key(EXTRA_SCOPE));
}

#[tokio::test]
async fn test_rotation_makes_refresh_token_single_use() {
    let fixture = Fixture::new(true).await;
    let token = fixture.issue(&["read"]).await;
    let exchange = fixture.exchange();

    let access = exchange
        .refresh_token(&refresh_request(&token.id))
        .await
        .unwrap();

    let rotated_id = access.extra_data.get(EXTRA_REFRESH_TOKEN).unwrap().clone();
    assert_ne!(rotated_id, token.id);
    assert_eq!(access.refresh_token_id.as_deref(), Some(rotated_id.as_str()));
    assert!(!fixture.store.contains(&token.id).await);

    let rotated = fixture
        .store
        .read_refresh_token(&rotated_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rotated.client_id, token.client_id);
    assert_eq!(rotated.owner, token.owner);
    assert_eq!(rotated.scope, token.scope);
    assert_eq!(rotated.redirect_uri, token.redirect_uri);
    assert_eq!(rotated.auth_grant_id, token.auth_grant_id);

    let replay = exchange
        .refresh_token(&refresh_request(&token.id))
        .await
        .unwrap_err();
    assert_invalid_request(&replay, "RefreshToken does not exist");

    // The rotated token works in turn
    exchange
        .refresh_token(&refresh_request(&rotated_id))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_without_rotation_token_is_reusable() {
    let fixture = Fixture::new(false).await;
    let token = fixture.issue(&["read"]).await;
    let exchange = fixture.exchange();

    let first = exchange
        .refresh_token(&refresh_request(&token.id))
        .await
        .unwrap();
    let second = exchange
        .refresh_token(&refresh_request(&token.id))
        .await
        .unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(first.refresh_token_id.as_deref(), Some(token.id.as_str()));
    assert_eq!(second.refresh_token_id.as_deref(), Some(token.id.as_str()));
    assert!(!first.extra_data.contains_key(EXTRA_REFRESH_TOKEN));
    assert!(fixture.store.contains(&token.id).await);
}

#[tokio::test]
async fn test_client_mismatch_rejected() {
    let fixture = Fixture::new(true).await;
    let token = fixture.issue(&["read"]).await;
    let request = OAuth2Request::new(REALM)
        .with_parameter(params::REFRESH_TOKEN, token.id.clone())
        .with_basic_credentials("other", "other-secret");

    let err = fixture.exchange().refresh_token(&request).await.unwrap_err();

    assert_invalid_request(&err, "Token was issued to a different client");
    assert!(fixture.store.contains(&token.id).await);
    let failures = fixture
        .audit_repository
        .entries_of(AuditEventType::RefreshTokenFailure)
        .await;
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].token_id.as_deref(), Some(token.id.as_str()));
}

#[tokio::test]
async fn test_client_id_compared_case_insensitively() {
    let fixture = Fixture::new(false).await;
    let token = fixture
        .issue_with(&["read"], |token| token.client_id = "WebApp".to_string())
        .await;

    let result = fixture
        .exchange()
        .refresh_token(&refresh_request(&token.id))
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_expired_token_is_invalid_grant() {
    let fixture = Fixture::new(true).await;
    let token = fixture
        .issue_with(&["read"], |token| {
            token.expires_at = Utc::now() - Duration::seconds(1)
        })
        .await;

    let err = fixture
        .exchange()
        .refresh_token(&refresh_request(&token.id))
        .await
        .unwrap_err();

    match err {
        OAuth2Error::InvalidGrant { description } => assert_eq!(description, "grant is invalid"),
        other => panic!("expected invalid_grant, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_refresh_record_is_invalid_grant() {
    let fixture = Fixture::new(true).await;
    let token = fixture
        .issue_with(&["read"], |token| token.token_type = TokenType::Session)
        .await;

    let err = fixture
        .exchange()
        .refresh_token(&refresh_request(&token.id))
        .await
        .unwrap_err();

    assert!(matches!(err, OAuth2Error::InvalidGrant { .. }));
}

#[tokio::test]
async fn test_access_token_id_presented_as_refresh_token_is_invalid_grant() {
    let fixture = Fixture::new(false).await;
    let token = fixture.issue(&["read"]).await;
    let exchange = fixture.exchange();

    let access = exchange
        .refresh_token(&refresh_request(&token.id))
        .await
        .unwrap();

    let err = exchange
        .refresh_token(&refresh_request(&access.id))
        .await
        .unwrap_err();

    match err {
        OAuth2Error::InvalidGrant { description } => assert_eq!(description, "grant is invalid"),
        other => panic!("expected invalid_grant, got {:?}", other),
    }
}

#[tokio::test]
async fn test_deactivated_owner_rejected_through_identity_cache() {
    let fixture = Fixture::new(false).await;
    let token = fixture.issue(&["read"]).await;
    let identities = Arc::new(CachedIdentityManager::new(
        fixture.identities.clone(),
        Arc::new(TtlCache::new(StdDuration::from_secs(300), 100)),
    ));
    let exchange = fixture.exchange_with(identities);

    exchange
        .refresh_token(&refresh_request(&token.id))
        .await
        .unwrap();

    fixture.identities.deactivate(&token.owner).await;
    let err = exchange
        .refresh_token(&refresh_request(&token.id))
        .await
        .unwrap_err();

    assert_invalid_request(&err, "Resource owner of this refresh token is not valid any more.");
}

#[tokio::test]
async fn test_inactive_and_unauthorized_owners_look_the_same() {
    let fixture = Fixture::new(true).await;
    let token = fixture.issue(&["read"]).await;
    let exchange = fixture.exchange();

    fixture.identities.deactivate(&token.owner).await;
    let inactive = exchange
        .refresh_token(&refresh_request(&token.id))
        .await
        .unwrap_err();

    fixture.identities.deny(token.owner.clone()).await;
    let denied = exchange
        .refresh_token(&refresh_request(&token.id))
        .await
        .unwrap_err();

    assert_invalid_request(&inactive, "Resource owner of this refresh token is not valid any more.");
    assert_eq!(inactive, denied);
    assert!(fixture.store.contains(&token.id).await);
}

#[tokio::test]
async fn test_unknown_owner_rejected() {
    let fixture = Fixture::new(true).await;
    let token = fixture
        .issue_with(&["read"], |token| token.owner = OwnerRef::new("ghost", REALM))
        .await;

    let err = fixture
        .exchange()
        .refresh_token(&refresh_request(&token.id))
        .await
        .unwrap_err();

    assert_invalid_request(&err, "Resource owner of this refresh token is not valid any more.");
}

#[tokio::test]
async fn test_audit_tracking_id_recorded() {
    let fixture = Fixture::new(true).await;
    let token = fixture.issue(&["read"]).await;

    fixture
        .exchange()
        .refresh_token(&refresh_request(&token.id))
        .await
        .unwrap();

    assert_eq!(
        fixture.audit_context.property(OAUTH2_GRANT),
        Some(token.audit_tracking_id.clone())
    );
}

#[tokio::test]
async fn test_audit_context_failure_does_not_abort() {
    let fixture = Fixture::new(true).await;
    let token = fixture.issue(&["read"]).await;
    fixture.audit_context.set_should_fail(true);
    fixture.audit_repository.set_should_fail(true);

    let result = fixture
        .exchange()
        .refresh_token(&refresh_request(&token.id))
        .await;

    assert!(result.is_ok());
    assert_eq!(fixture.audit_context.property(OAUTH2_GRANT), None);
}

#[tokio::test]
async fn test_success_audited_by_rotation_mode() {
    let rotating = Fixture::new(true).await;
    let token = rotating.issue(&["read"]).await;
    let access = rotating
        .exchange()
        .refresh_token(&refresh_request(&token.id))
        .await
        .unwrap();

    let rotated = rotating
        .audit_repository
        .entries_of(AuditEventType::RefreshTokenRotated)
        .await;
    assert_eq!(rotated.len(), 1);
    assert_eq!(rotated[0].tracking_id.as_deref(), Some(token.audit_tracking_id.as_str()));
    assert_eq!(
        rotated[0].event_data.as_ref().unwrap()["rotated_to"],
        serde_json::json!(access.extra_data[EXTRA_REFRESH_TOKEN])
    );

    let plain = Fixture::new(false).await;
    let token = plain.issue(&["read"]).await;
    plain
        .exchange()
        .refresh_token(&refresh_request(&token.id))
        .await
        .unwrap();
    assert_eq!(
        plain
            .audit_repository
            .entries_of(AuditEventType::RefreshTokenSuccess)
            .await
            .len(),
        1
    );
}

#[tokio::test]
async fn test_store_outage_is_server_error() {
    let fixture = Fixture::new(true).await;
    fixture.store.set_unavailable(true);

    let err = fixture
        .exchange()
        .refresh_token(&refresh_request("any"))
        .await
        .unwrap_err();

    assert!(matches!(err, OAuth2Error::Server { .. }));
    assert_eq!(err.status_code(), 500);
}

#[tokio::test]
async fn test_malformed_claims_rejected() {
    let fixture = Fixture::new(true).await;
    let token = fixture
        .issue_with(&["openid"], |token| token.claims = Some("not json".to_string()))
        .await;

    let err = fixture
        .exchange()
        .refresh_token(&refresh_request(&token.id))
        .await
        .unwrap_err();

    assert!(matches!(err, OAuth2Error::InvalidRequest { .. }));
    assert!(fixture.store.contains(&token.id).await);
}

#[tokio::test]
async fn test_claims_carried_to_access_token() {
    let fixture = Fixture::new(true).await;
    let claims = r#"{"userinfo":{"email":null}}"#;
    let token = fixture
        .issue_with(&["openid"], |token| token.claims = Some(claims.to_string()))
        .await;

    let access = fixture
        .exchange()
        .refresh_token(&refresh_request(&token.id))
        .await
        .unwrap();

    assert_eq!(access.claims.as_deref(), Some(claims));
}
