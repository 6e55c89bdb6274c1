//! Shared fixtures for API client integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use cardissue_common::auth::MemoryTokenStore;
use cardissue_infra::observability::{init_tracing_with, LogFormat};
use cardissue_infra::ApiClient;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const REFRESH_PATH: &str = "/api/v1/auth/refresh";

/// Client against `server` with tokens pre-seeded in a memory store.
pub fn seeded_client(
    server: &MockServer,
    access: &str,
    refresh: Option<&str>,
) -> (ApiClient, Arc<MemoryTokenStore>) {
    let _ = init_tracing_with(LogFormat::Pretty, "debug");

    let store = Arc::new(MemoryTokenStore::with_tokens(access, refresh));
    let client = ApiClient::builder()
        .base_url(server.uri())
        .request_timeout(Duration::from_secs(5))
        .refresh_timeout(Duration::from_secs(5))
        .token_store(store.clone())
        .build()
        .expect("api client should build");

    (client, store)
}

/// Refresh endpoint answering `A2`/`R2` after `delay`, expected `times` times.
pub async fn mount_rotating_refresh(server: &MockServer, delay: Duration, times: u64) {
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "accessToken": "A2", "refreshToken": "R2" }))
                .set_delay(delay),
        )
        .expect(times)
        .mount(server)
        .await;
}

/// Refresh endpoint that must never be hit.
pub async fn forbid_refresh(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}
