//! Integration tests for the authenticated request pipeline.
//!
//! These verify the 401 contract end to end against a mock backend:
//! - No network call is made when host or access token is absent
//! - A 401 triggers exactly one refresh and at most one retry
//! - The retry authenticates with the newly persisted token
//! - Refresh failures surface the original 401 and persist nothing
//! - Non-401 errors pass through with zero refresh attempts

use std::sync::Arc;

use tillpoint_api::{ApiClient, ApiError, Method, RequestBody, StatusCode};
use tillpoint_core::{CredentialKey, CredentialStore, MemoryStore, Secret};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Build a client against the mock server with the given slots populated.
async fn client_with(
    server: &MockServer,
    slots: &[(CredentialKey, &str)],
) -> (ApiClient, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    for (key, value) in slots {
        store.set(*key, &Secret::new(*value)).await.unwrap();
    }
    let client = ApiClient::new(format!("{}/api", server.uri()), store.clone()).unwrap();
    (client, store)
}

#[tokio::test]
async fn missing_access_token_fails_before_any_network_call() {
    let server = MockServer::start().await;

    // Any request reaching the server would trip this.
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (client, _store) = client_with(&server, &[(CredentialKey::Host, "shop.api.localhost")]).await;

    let result = client
        .execute(Method::GET, "/products", RequestBody::Empty)
        .await;
    assert!(matches!(result, Err(ApiError::NoAccessToken)));
}

#[tokio::test]
async fn missing_host_fails_before_any_network_call() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (client, _store) =
        client_with(&server, &[(CredentialKey::AccessToken, "some-token")]).await;

    let result = client
        .execute(Method::GET, "/products", RequestBody::Empty)
        .await;
    assert!(matches!(result, Err(ApiError::HostNotConfigured)));
}

#[tokio::test]
async fn valid_token_passes_response_through() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(header("Authorization", "Bearer valid-token"))
        .and(header("Accept", "application/json"))
        .and(header("Host", "shop.api.localhost"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "items": [], "total": 0 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = client_with(
        &server,
        &[
            (CredentialKey::Host, "shop.api.localhost"),
            (CredentialKey::AccessToken, "valid-token"),
        ],
    )
    .await;

    let response = client
        .execute(Method::GET, "/products", RequestBody::Empty)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn expired_token_refreshes_once_and_retries_with_new_token() {
    let server = MockServer::start().await;

    // The stale token is rejected...
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(header("Authorization", "Bearer stale-token"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    // ...the refresh token buys a new pair...
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(header("Authorization", "Bearer good-refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "fresh-token",
            "refresh_token": "rotated-refresh",
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    // ...and the retry carries the fresh token, not the stale one.
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(header("Authorization", "Bearer fresh-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "items": [], "total": 0 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_with(
        &server,
        &[
            (CredentialKey::Host, "shop.api.localhost"),
            (CredentialKey::AccessToken, "stale-token"),
            (CredentialKey::RefreshToken, "good-refresh"),
        ],
    )
    .await;

    let response = client
        .execute(Method::GET, "/products", RequestBody::Empty)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Both slots hold the rotated pair.
    assert_eq!(
        store
            .get(CredentialKey::AccessToken)
            .await
            .unwrap()
            .unwrap()
            .expose(),
        "fresh-token"
    );
    assert_eq!(
        store
            .get(CredentialKey::RefreshToken)
            .await
            .unwrap()
            .unwrap()
            .expose(),
        "rotated-refresh"
    );
}

#[tokio::test]
async fn failed_refresh_returns_the_original_401_and_persists_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_with(
        &server,
        &[
            (CredentialKey::Host, "shop.api.localhost"),
            (CredentialKey::AccessToken, "stale-token"),
            (CredentialKey::RefreshToken, "dead-refresh"),
        ],
    )
    .await;

    let response = client
        .execute(Method::GET, "/products", RequestBody::Empty)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The stale pair is untouched.
    assert_eq!(
        store
            .get(CredentialKey::AccessToken)
            .await
            .unwrap()
            .unwrap()
            .expose(),
        "stale-token"
    );
    assert_eq!(
        store
            .get(CredentialKey::RefreshToken)
            .await
            .unwrap()
            .unwrap()
            .expose(),
        "dead-refresh"
    );
}

#[tokio::test]
async fn persistent_401_is_retried_exactly_once() {
    let server = MockServer::start().await;

    // The backend keeps saying 401 no matter which token arrives.
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "fresh-token",
            "refresh_token": "rotated-refresh"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = client_with(
        &server,
        &[
            (CredentialKey::Host, "shop.api.localhost"),
            (CredentialKey::AccessToken, "stale-token"),
            (CredentialKey::RefreshToken, "good-refresh"),
        ],
    )
    .await;

    let response = client
        .execute(Method::GET, "/products", RequestBody::Empty)
        .await
        .unwrap();

    // The caller sees the 401; no loop.
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_401_error_passes_through_with_zero_refresh_attempts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (client, _store) = client_with(
        &server,
        &[
            (CredentialKey::Host, "shop.api.localhost"),
            (CredentialKey::AccessToken, "valid-token"),
            (CredentialKey::RefreshToken, "good-refresh"),
        ],
    )
    .await;

    let response = client
        .execute(Method::GET, "/products", RequestBody::Empty)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn transport_failure_surfaces_as_transport_error() {
    // Port 1 is never serving; the connection is refused.
    let store = Arc::new(MemoryStore::new());
    store
        .set(CredentialKey::Host, &Secret::new("shop.api.localhost"))
        .await
        .unwrap();
    store
        .set(CredentialKey::AccessToken, &Secret::new("valid-token"))
        .await
        .unwrap();

    let client = ApiClient::new("http://127.0.0.1:1/api", store).unwrap();
    let result = client
        .execute(Method::GET, "/products", RequestBody::Empty)
        .await;
    assert!(matches!(result, Err(ApiError::Transport(_))));
}

#[tokio::test]
async fn refresh_without_refresh_token_declines_without_network() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (client, _store) =
        client_with(&server, &[(CredentialKey::Host, "shop.api.localhost")]).await;

    assert!(!client.refresh().await.unwrap());
}

#[tokio::test]
async fn refresh_with_partial_payload_persists_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "fresh-token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_with(
        &server,
        &[
            (CredentialKey::Host, "shop.api.localhost"),
            (CredentialKey::AccessToken, "stale-token"),
            (CredentialKey::RefreshToken, "good-refresh"),
        ],
    )
    .await;

    assert!(!client.refresh().await.unwrap());

    assert_eq!(
        store
            .get(CredentialKey::AccessToken)
            .await
            .unwrap()
            .unwrap()
            .expose(),
        "stale-token"
    );
    assert_eq!(
        store
            .get(CredentialKey::RefreshToken)
            .await
            .unwrap()
            .unwrap()
            .expose(),
        "good-refresh"
    );
}

#[tokio::test]
async fn refresh_transport_failure_is_caught_and_declined() {
    let store = Arc::new(MemoryStore::new());
    store
        .set(CredentialKey::Host, &Secret::new("shop.api.localhost"))
        .await
        .unwrap();
    store
        .set(CredentialKey::RefreshToken, &Secret::new("good-refresh"))
        .await
        .unwrap();

    let client = ApiClient::new("http://127.0.0.1:1/api", store).unwrap();
    assert!(!client.refresh().await.unwrap());
}
