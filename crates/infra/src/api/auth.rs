//! Refresh-endpoint transport
//!
//! Implements [`RefreshTransport`] over HTTP so the shared
//! [`RefreshCoordinator`](cardissue_common::RefreshCoordinator) can exchange
//! a refresh token against the backend.

use async_trait::async_trait;
use cardissue_common::{RefreshError, RefreshTransport, RefreshedTokens};
use cardissue_domain::constants::REFRESH_PATH;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use crate::http::HttpClient;

/// POSTs `{"refreshToken": …}` to the refresh endpoint.
///
/// No `Authorization` header is sent; the refresh token is the credential.
#[derive(Debug, Clone)]
pub struct HttpRefreshTransport {
    http: HttpClient,
    url: String,
}

impl HttpRefreshTransport {
    /// Create a transport targeting `{base_url}/api/v1/auth/refresh`
    #[must_use]
    pub fn new(http: HttpClient, base_url: &str) -> Self {
        Self { http, url: format!("{}{}", base_url.trim_end_matches('/'), REFRESH_PATH) }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RefreshTransport for HttpRefreshTransport {
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, RefreshError> {
        let request = self
            .http
            .request(Method::POST, &self.url)
            .json(&json!({ "refreshToken": refresh_token }));

        let response = self
            .http
            .send(request)
            .await
            .map_err(|e| RefreshError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| RefreshError::Transport(e.to_string()))?;
        let payload: Option<Value> = serde_json::from_slice(&body).ok();

        if !status.is_success() {
            let message = payload
                .as_ref()
                .and_then(|p| p.get("message"))
                .and_then(Value::as_str)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("refresh rejected"))
                .to_string();
            debug!(status = status.as_u16(), %message, "Refresh endpoint rejected token");
            return Err(RefreshError::Rejected { status: status.as_u16(), message });
        }

        let payload = payload.ok_or_else(|| {
            RefreshError::InvalidResponse("refresh response is not JSON".to_string())
        })?;

        RefreshedTokens::from_response_body(&payload).ok_or_else(|| {
            RefreshError::InvalidResponse("refresh response carries no access token".to_string())
        })
    }
}
