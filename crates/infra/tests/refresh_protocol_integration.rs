//! Integration tests for the refresh-and-retry protocol
//!
//! **Coverage:**
//! - Rotation: 401 → refresh → replay with the new bearer token
//! - Single flight: concurrent 401s share one refresh call
//! - Forced logout: failed or impossible refresh clears tokens and ends the
//!   session
//! - No loop: auth endpoints never trigger a refresh
//! - Totality: every outcome resolves to `Ok` or `Err`
//!
//! **Infrastructure:**
//! - WireMock HTTP server standing in for the backend
//! - In-memory token store

#![allow(dead_code)]

#[path = "support.rs"]
mod support;

use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use cardissue_common::auth::MemoryTokenStore;
use cardissue_common::TokenStore;
use cardissue_infra::{ApiClient, ApiError, MultipartBody, RequestOptions, SessionStatus};
use serde_json::json;
use support::{forbid_refresh, mount_rotating_refresh, seeded_client, REFRESH_PATH};
use wiremock::matchers::{body_json, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mount `/cards/x`: 401 for the stale token, 200 for the refreshed one.
async fn mount_card_endpoint(server: &MockServer, stale_hits: u64, fresh_hits: u64) {
    Mock::given(method("GET"))
        .and(path("/cards/x"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "expired" })))
        .expect(stale_hits)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/cards/x"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "x" })))
        .expect(fresh_hits)
        .mount(server)
        .await;
}

// ============================================================================
// Rotation
// ============================================================================

/// Stale access token is refreshed and the original call replayed.
///
/// # Test Steps
/// 1. Store holds A1/R1; `/cards/x` rejects A1 and accepts A2
/// 2. Refresh with R1 returns A2/R2
/// 3. Verify stored pair is A2/R2 and the caller sees the replayed result
#[tokio::test]
async fn test_401_refreshes_and_replays_with_new_token() {
    let server = MockServer::start().await;
    mount_card_endpoint(&server, 1, 1).await;
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .and(body_json(json!({ "refreshToken": "R1" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "accessToken": "A2", "refreshToken": "R2" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = seeded_client(&server, "A1", Some("R1"));
    let payload = client.call("/cards/x", RequestOptions::get()).await.unwrap();

    assert_eq!(payload, json!({ "id": "x" }));
    assert_eq!(store.access_token().await.unwrap().as_deref(), Some("A2"));
    assert_eq!(store.refresh_token().await.unwrap().as_deref(), Some("R2"));
    assert_eq!(client.session_status(), SessionStatus::Authenticated);
}

/// A refresh that returns only an access token keeps the refresh token.
#[tokio::test]
async fn test_refresh_without_rotation_keeps_refresh_token() {
    let server = MockServer::start().await;
    mount_card_endpoint(&server, 1, 1).await;
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "accessToken": "A2" } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = seeded_client(&server, "A1", Some("R1"));
    client.call("/cards/x", RequestOptions::get()).await.unwrap();

    assert_eq!(store.access_token().await.unwrap().as_deref(), Some("A2"));
    assert_eq!(store.refresh_token().await.unwrap().as_deref(), Some("R1"));
}

/// The replayed call's outcome is final, even when it is another 401.
#[tokio::test]
async fn test_replay_is_attempted_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cards/x"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Access denied" })),
        )
        .expect(2)
        .mount(&server)
        .await;
    mount_rotating_refresh(&server, Duration::ZERO, 1).await;

    let (client, _store) = seeded_client(&server, "A1", Some("R1"));
    let err = client.call("/cards/x", RequestOptions::get()).await.unwrap_err();

    assert_eq!(err, ApiError::Status { status: 401, message: "Access denied".into() });
}

/// Multipart bodies are rebuilt for the replay.
#[tokio::test]
async fn test_multipart_body_is_replayed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/batch/upload-excel"))
        .and(header("authorization", "Bearer A1"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/batch/upload-excel"))
        .and(header("authorization", "Bearer A2"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "valid": 3 })))
        .expect(1)
        .mount(&server)
        .await;
    mount_rotating_refresh(&server, Duration::ZERO, 1).await;

    let (client, _store) = seeded_client(&server, "A1", Some("R1"));
    let form = MultipartBody::new().file("file", "staff.xlsx", b"PK\x03\x04".to_vec(), None);
    let payload = client
        .call("/api/v1/batch/upload-excel", RequestOptions::post().with_multipart(form))
        .await
        .unwrap();

    assert_eq!(payload, json!({ "valid": 3 }));
}

// ============================================================================
// Single flight
// ============================================================================

/// Two concurrent 401s share one refresh call.
///
/// # Test Steps
/// 1. Refresh endpoint answers after 200ms so the second 401 arrives while
///    the first refresh is in flight
/// 2. Both calls complete with the replayed payload
/// 3. WireMock verifies exactly one refresh POST on drop
#[tokio::test]
async fn test_concurrent_401s_share_single_refresh() {
    let server = MockServer::start().await;
    mount_card_endpoint(&server, 2, 2).await;
    mount_rotating_refresh(&server, Duration::from_millis(200), 1).await;

    let (client, store) = seeded_client(&server, "A1", Some("R1"));
    let (a, b) = futures::join!(
        client.call("/cards/x", RequestOptions::get()),
        client.call("/cards/x", RequestOptions::get()),
    );

    assert_eq!(a.unwrap(), json!({ "id": "x" }));
    assert_eq!(b.unwrap(), json!({ "id": "x" }));
    assert_eq!(store.refresh_token().await.unwrap().as_deref(), Some("R2"));
}

/// A burst of callers still produces one refresh.
#[tokio::test]
async fn test_burst_of_401s_share_single_refresh() {
    let server = MockServer::start().await;
    mount_card_endpoint(&server, 5, 5).await;
    mount_rotating_refresh(&server, Duration::from_millis(200), 1).await;

    let (client, _store) = seeded_client(&server, "A1", Some("R1"));
    let calls = (0..5).map(|_| client.call("/cards/x", RequestOptions::get()));
    let results = futures::future::join_all(calls).await;

    assert!(results.into_iter().all(|r| r == Ok(json!({ "id": "x" }))));
}

// ============================================================================
// Forced logout
// ============================================================================

/// Refresh rejected with 400: every waiting caller sees "session expired".
///
/// # Test Steps
/// 1. Two concurrent calls hit 401
/// 2. The single refresh call answers 400
/// 3. Verify both fail with `SessionExpired`, tokens are gone and the
///    session watch reports `Expired`
#[tokio::test]
async fn test_failed_refresh_forces_logout_for_all_waiters() {
    let server = MockServer::start().await;
    mount_card_endpoint(&server, 2, 0).await;
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "message": "Refresh token revoked" }))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = seeded_client(&server, "A1", Some("R1"));
    let mut session = client.subscribe_session();

    let (a, b) = futures::join!(
        client.call("/cards/x", RequestOptions::get()),
        client.call("/cards/x", RequestOptions::get()),
    );

    assert_eq!(a, Err(ApiError::SessionExpired));
    assert_eq!(b, Err(ApiError::SessionExpired));
    assert_eq!(a.unwrap_err().message(), "Your session has expired. Please log in again.");
    assert!(store.access_token().await.unwrap().is_none());
    assert!(store.refresh_token().await.unwrap().is_none());

    assert!(session.has_changed().unwrap());
    assert_eq!(*session.borrow_and_update(), SessionStatus::Expired);
}

/// No refresh token stored: logout without any refresh request.
#[tokio::test]
async fn test_missing_refresh_token_forces_logout_without_network() {
    let server = MockServer::start().await;
    mount_card_endpoint(&server, 1, 0).await;
    forbid_refresh(&server).await;

    let (client, store) = seeded_client(&server, "A1", None);
    let err = client.call("/cards/x", RequestOptions::get()).await.unwrap_err();

    assert_eq!(err, ApiError::SessionExpired);
    assert!(store.access_token().await.unwrap().is_none());
    assert_eq!(client.session_status(), SessionStatus::Expired);
}

/// A hung refresh is bounded by the refresh timeout.
#[tokio::test]
async fn test_hung_refresh_times_out_into_logout() {
    let server = MockServer::start().await;
    mount_card_endpoint(&server, 1, 0).await;
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "accessToken": "A2" }))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens("A1", Some("R1")));
    let client = ApiClient::builder()
        .base_url(server.uri())
        .refresh_timeout(Duration::from_millis(100))
        .token_store(store.clone())
        .build()
        .unwrap();

    let err = client.call("/cards/x", RequestOptions::get()).await.unwrap_err();

    assert_eq!(err, ApiError::SessionExpired);
    assert!(store.refresh_token().await.unwrap().is_none());
}

// ============================================================================
// No loop
// ============================================================================

/// Login rejected with 401 returns the server message without refreshing.
#[tokio::test]
async fn test_login_401_never_refreshes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "message": "Invalid ID or password" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    forbid_refresh(&server).await;

    let (client, store) = seeded_client(&server, "A1", Some("R1"));
    let err = client.login("admin", "wrong").await.unwrap_err();

    assert_eq!(err, ApiError::Status { status: 401, message: "Invalid ID or password".into() });
    // A rejected login leaves the existing session untouched.
    assert_eq!(store.refresh_token().await.unwrap().as_deref(), Some("R1"));
}

/// A 401 from any auth-surface path is returned as is.
#[tokio::test]
async fn test_auth_paths_never_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    forbid_refresh(&server).await;

    let (client, _store) = seeded_client(&server, "A1", Some("R1"));
    let err = client.call("/api/v1/auth/me", RequestOptions::get()).await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert_eq!(client.session_status(), SessionStatus::Anonymous);
}

// ============================================================================
// Totality
// ============================================================================

/// Transport failure, error status and success each map to one shape.
#[tokio::test]
async fn test_every_outcome_is_ok_or_err() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "fine": true })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/boom"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "DB down" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let (client, _store) = seeded_client(&server, "A1", Some("R1"));

    assert_eq!(client.call("/ok", RequestOptions::get()).await, Ok(json!({ "fine": true })));
    assert_eq!(
        client.call("/boom", RequestOptions::get()).await,
        Err(ApiError::Status { status: 500, message: "DB down".into() })
    );
    assert!(matches!(
        client.call("/html", RequestOptions::get()).await,
        Err(ApiError::Serialization(_))
    ));

    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let offline =
        ApiClient::builder().base_url(format!("http://127.0.0.1:{port}")).build().unwrap();
    let err = offline.call("/ok", RequestOptions::get()).await.unwrap_err();

    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(err.message(), "A network error occurred.");
}
