//! Authenticated API client
//!
//! Every backend call goes through [`ApiClient::call`] (or its typed and
//! binary siblings). The client attaches the stored bearer token, and when
//! the backend answers `401` on a non-auth path it refreshes the token once,
//! shared with any other caller that hit `401` meanwhile, and replays the
//! original request a single time. A failed refresh ends the session.

use std::sync::Arc;
use std::time::Duration;

use cardissue_common::auth::{
    is_token_expired, token_expiry, FileTokenStore, KeychainTokenStore, MemoryTokenStore,
};
use cardissue_common::{RefreshCoordinator, RefreshTransport, RefreshedTokens, TokenStore};
use cardissue_domain::constants::{
    AUTH_PATH_MARKER, LOGIN_PATH, LOGOUT_PATH, MSG_REQUEST_FAILED,
};
use cardissue_domain::{ApiConfig, ClientConfig};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use super::auth::HttpRefreshTransport;
use super::errors::{ApiError, ApiResult};
use super::request::{RequestBody, RequestOptions};
use super::session::SessionStatus;
use crate::http::HttpClient;

/// Client for the card issuance backend.
pub struct ApiClient {
    http: HttpClient,
    base_url: String,
    store: Arc<dyn TokenStore>,
    refresher: RefreshCoordinator,
    session: watch::Sender<SessionStatus>,
}

impl ApiClient {
    /// Create a builder for fluent configuration
    #[must_use]
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Create a client from loaded configuration.
    ///
    /// Token storage is chosen from `config.storage`: the platform keychain
    /// when a service name is set, otherwise a token file, otherwise memory.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is invalid, the HTTP client cannot be
    /// built or the keychain is unavailable
    pub fn from_config(config: &ClientConfig) -> ApiResult<Self> {
        let store: Arc<dyn TokenStore> = match (
            &config.storage.keychain_service,
            &config.storage.token_file,
        ) {
            (Some(service), _) => Arc::new(KeychainTokenStore::new(service.clone())?),
            (None, Some(path)) => Arc::new(FileTokenStore::new(path.clone())),
            (None, None) => Arc::new(MemoryTokenStore::new()),
        };

        Self::builder().config(&config.api).token_store(store).build()
    }

    /// Execute a request and return the JSON payload.
    ///
    /// Empty success bodies yield `Value::Null`.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Network`] when no response arrived
    /// - [`ApiError::SessionExpired`] when a refresh was needed and failed
    /// - [`ApiError::Status`] for non-success responses, carrying the
    ///   server's `message` when it sent one
    /// - [`ApiError::Serialization`] for a success body that is not JSON
    #[instrument(skip(self, options), fields(method = %options.method))]
    pub async fn call(&self, path: &str, options: RequestOptions) -> ApiResult<Value> {
        let response = self.execute(path, &options).await?;
        read_payload(response).await
    }

    /// Execute a request and deserialize the JSON payload into `T`.
    ///
    /// # Errors
    ///
    /// As [`call`](Self::call), plus [`ApiError::Serialization`] when the
    /// payload does not match `T`
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ApiResult<T> {
        let payload = self.call(path, options).await?;
        serde_json::from_value(payload)
            .map_err(|e| ApiError::Serialization(format!("unexpected response shape: {e}")))
    }

    /// Execute a request and return the raw body bytes.
    ///
    /// Used for file exports. Takes part in token refresh like [`call`](Self::call).
    ///
    /// # Errors
    ///
    /// As [`call`](Self::call); the body is not parsed on success
    #[instrument(skip(self, options), fields(method = %options.method))]
    pub async fn download(&self, path: &str, options: RequestOptions) -> ApiResult<Vec<u8>> {
        let response = self.execute(path, &options).await?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(status_error(status, parse_body(&body).ok().as_ref()));
        }

        debug!(bytes = body.len(), "Download complete");
        Ok(body.to_vec())
    }

    /// Sign in with operator credentials and store the issued tokens.
    ///
    /// Returns the full login payload (it also carries the operator profile).
    ///
    /// # Errors
    ///
    /// A rejected login surfaces as [`ApiError::Status`]; it never triggers a
    /// refresh.
    #[instrument(skip(self, password))]
    pub async fn login(&self, mg_id: &str, password: &str) -> ApiResult<Value> {
        let options =
            RequestOptions::post().with_json(json!({ "mgId": mg_id, "password": password }));
        let payload = self.call(LOGIN_PATH, options).await?;

        let tokens = RefreshedTokens::from_response_body(&payload).ok_or_else(|| {
            ApiError::Serialization("login response carries no access token".to_string())
        })?;
        self.store.store_pair(&tokens.to_pair()).await?;
        self.publish(SessionStatus::Authenticated);

        info!("Operator logged in");
        Ok(payload)
    }

    /// Tell the backend the session ends, then drop local tokens.
    ///
    /// The backend call is best effort; local state is cleared whatever it
    /// returns.
    ///
    /// # Errors
    ///
    /// Returns error only if the token store cannot be cleared
    #[instrument(skip(self))]
    pub async fn logout(&self) -> ApiResult<()> {
        if let Err(err) = self.call(LOGOUT_PATH, RequestOptions::post()).await {
            warn!(error = %err, "Logout request failed; clearing local session anyway");
        }

        self.store.clear().await?;
        self.publish(SessionStatus::LoggedOut);
        info!("Operator logged out");
        Ok(())
    }

    /// Drop local tokens without contacting the backend.
    ///
    /// # Errors
    ///
    /// Returns error if the token store cannot be cleared
    pub async fn reset(&self) -> ApiResult<()> {
        self.store.clear().await?;
        self.publish(SessionStatus::Anonymous);
        Ok(())
    }

    /// Mark the session authenticated if stored tokens look usable.
    ///
    /// Call once at startup when tokens persist across runs.
    ///
    /// # Errors
    ///
    /// Returns error if the token store cannot be read
    pub async fn restore_session(&self) -> ApiResult<SessionStatus> {
        if self.has_valid_session().await? {
            self.publish(SessionStatus::Authenticated);
        }
        Ok(self.session_status())
    }

    /// Whether a usable access token is stored.
    ///
    /// A JWT whose `exp` has passed counts as unusable; opaque tokens count
    /// as usable until the backend says otherwise.
    ///
    /// # Errors
    ///
    /// Returns error if the token store cannot be read
    pub async fn has_valid_session(&self) -> ApiResult<bool> {
        let Some(token) = self.store.access_token().await? else {
            return Ok(false);
        };

        Ok(token_expiry(&token).is_none() || !is_token_expired(&token))
    }

    #[must_use]
    pub fn session_status(&self) -> SessionStatus {
        *self.session.borrow()
    }

    /// Receive every session status change.
    #[must_use]
    pub fn subscribe_session(&self) -> watch::Receiver<SessionStatus> {
        self.session.subscribe()
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// Send once; on `401` outside the auth surface refresh and replay once.
    async fn execute(&self, path: &str, options: &RequestOptions) -> ApiResult<Response> {
        let token = self.store.access_token().await?;
        let response = self.send_once(path, options, token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED || is_auth_path(path) {
            return Ok(response);
        }

        debug!(path, "Access token rejected; refreshing");
        match self.refresher.refresh().await {
            Ok(access_token) => {
                self.publish(SessionStatus::Authenticated);
                self.send_once(path, options, Some(&access_token)).await
            }
            Err(err) => {
                warn!(path, error = %err, "Token refresh failed; ending session");
                self.force_logout().await;
                Err(ApiError::SessionExpired)
            }
        }
    }

    async fn send_once(
        &self,
        path: &str,
        options: &RequestOptions,
        token: Option<&str>,
    ) -> ApiResult<Response> {
        let url = format!("{}{}", self.base_url, path);
        let headers = build_headers(options, token)?;

        let request = self.http.request(options.method.clone(), &url).headers(headers);
        let request = match &options.body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(value),
            RequestBody::Multipart(body) => request.multipart(body.to_form()?),
            RequestBody::Bytes { data, .. } => request.body(data.clone()),
        };

        Ok(self.http.send(request).await?)
    }

    /// Clear tokens and announce the expired session. Idempotent.
    async fn force_logout(&self) {
        if let Err(err) = self.store.clear().await {
            warn!(error = %err, "Failed to clear tokens during forced logout");
        }

        let changed = self.session.send_if_modified(|status| {
            if *status == SessionStatus::Expired {
                false
            } else {
                *status = SessionStatus::Expired;
                true
            }
        });
        if changed {
            info!("Session expired; tokens cleared");
        }
    }

    fn publish(&self, next: SessionStatus) {
        self.session.send_if_modified(|status| {
            if *status == next {
                false
            } else {
                debug!(from = ?*status, to = ?next, "Session status changed");
                *status = next;
                true
            }
        });
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session_status())
            .field("refresher", &self.refresher)
            .finish_non_exhaustive()
    }
}

fn is_auth_path(path: &str) -> bool {
    path.contains(AUTH_PATH_MARKER)
}

/// Defaults first, caller headers over them, bearer token last.
fn build_headers(options: &RequestOptions, token: Option<&str>) -> ApiResult<HeaderMap> {
    let mut headers = HeaderMap::new();

    match &options.body {
        body if body.is_json() => {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        RequestBody::Bytes { content_type: Some(content_type), .. } => {
            let value = HeaderValue::from_str(content_type).map_err(|e| {
                ApiError::Config(format!("invalid content type '{content_type}': {e}"))
            })?;
            headers.insert(CONTENT_TYPE, value);
        }
        _ => {}
    }

    for (name, value) in &options.headers {
        headers.insert(name.clone(), value.clone());
    }

    if let Some(token) = token {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            ApiError::Storage("stored access token is not a valid header value".to_string())
        })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Ok(headers)
}

async fn read_payload(response: Response) -> ApiResult<Value> {
    let status = response.status();
    let body = response.bytes().await.map_err(|e| ApiError::Network(e.to_string()))?;
    let parsed = parse_body(&body);

    if !status.is_success() {
        return Err(status_error(status, parsed.ok().as_ref()));
    }

    parsed.map_err(|e| ApiError::Serialization(format!("response is not valid JSON: {e}")))
}

fn parse_body(body: &[u8]) -> Result<Value, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
}

fn status_error(status: StatusCode, payload: Option<&Value>) -> ApiError {
    let message = payload
        .and_then(|p| p.get("message"))
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or(MSG_REQUEST_FAILED)
        .to_string();

    ApiError::Status { status: status.as_u16(), message }
}

/// Builder for API client
pub struct ApiClientBuilder {
    base_url: String,
    request_timeout: Duration,
    refresh_timeout: Duration,
    user_agent: Option<String>,
    store: Option<Arc<dyn TokenStore>>,
    transport: Option<Arc<dyn RefreshTransport>>,
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self::default_from(&ApiConfig::default())
    }
}

impl ApiClientBuilder {
    fn default_from(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            request_timeout: config.request_timeout(),
            refresh_timeout: config.refresh_timeout(),
            user_agent: config.user_agent.clone(),
            store: None,
            transport: None,
        }
    }

    /// Take URL, timeouts and user agent from `config`
    #[must_use]
    pub fn config(self, config: &ApiConfig) -> Self {
        Self { store: self.store, transport: self.transport, ..Self::default_from(config) }
    }

    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Upper bound for one refresh round-trip
    #[must_use]
    pub fn refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Where tokens live. Defaults to an in-memory store.
    #[must_use]
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the refresh exchange. Defaults to [`HttpRefreshTransport`].
    #[must_use]
    pub fn refresh_transport(mut self, transport: Arc<dyn RefreshTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the API client
    ///
    /// # Errors
    ///
    /// Returns error if the base URL does not parse or the HTTP client
    /// cannot be created
    pub fn build(self) -> ApiResult<ApiClient> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url)
            .map_err(|e| ApiError::Config(format!("invalid base URL '{base_url}': {e}")))?;

        let mut http = HttpClient::builder().timeout(self.request_timeout);
        if let Some(agent) = self.user_agent {
            http = http.user_agent(agent);
        }
        let http = http.build()?;

        let store = self.store.unwrap_or_else(|| Arc::new(MemoryTokenStore::new()));
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(HttpRefreshTransport::new(http.clone(), &base_url)));
        let refresher = RefreshCoordinator::new(store.clone(), transport, self.refresh_timeout);
        let (session, _) = watch::channel(SessionStatus::Anonymous);

        Ok(ApiClient { http, base_url, store, refresher, session })
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderName;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::request::MultipartBody;

    fn client_for(server: &MockServer, store: Arc<MemoryTokenStore>) -> ApiClient {
        ApiClient::builder().base_url(server.uri()).token_store(store).build().unwrap()
    }

    #[test]
    fn test_builder_rejects_invalid_base_url() {
        let result = ApiClient::builder().base_url("not a url").build();
        assert!(matches!(result, Err(ApiError::Config(_))));
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let client = ApiClient::builder().base_url("http://localhost:8000/").build().unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.session_status(), SessionStatus::Anonymous);
    }

    #[test]
    fn test_auth_surface_detection() {
        assert!(is_auth_path("/api/v1/auth/login"));
        assert!(is_auth_path("/api/v1/auth/me"));
        assert!(!is_auth_path("/api/v1/card/history?page=0"));
        assert!(!is_auth_path("/api/v1/authority"));
    }

    #[test]
    fn test_caller_headers_override_defaults_but_not_bearer() {
        let options = RequestOptions::get()
            .with_header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
            .with_header(AUTHORIZATION, HeaderValue::from_static("Basic abc"))
            .with_header(HeaderName::from_static("x-trace"), HeaderValue::from_static("t-1"));

        let headers = build_headers(&options, Some("A1")).unwrap();

        assert_eq!(headers[CONTENT_TYPE], "text/plain");
        assert_eq!(headers[AUTHORIZATION], "Bearer A1");
        assert_eq!(headers["x-trace"], "t-1");
    }

    #[test]
    fn test_multipart_gets_no_json_content_type() {
        let options = RequestOptions::post().with_multipart(MultipartBody::new().text("a", "b"));
        let headers = build_headers(&options, None).unwrap();

        assert!(headers.get(CONTENT_TYPE).is_none());
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_parse_body_treats_blank_as_null() {
        assert_eq!(parse_body(b"").unwrap(), Value::Null);
        assert_eq!(parse_body(b"  \n").unwrap(), Value::Null);
        assert!(parse_body(b"<html>").is_err());
    }

    #[tokio::test]
    async fn test_call_attaches_bearer_and_returns_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/batch/list"))
            .and(header("authorization", "Bearer A1"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "no": "E1" }])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemoryTokenStore::with_tokens("A1", None)));
        let payload = client.call("/api/v1/batch/list", RequestOptions::get()).await.unwrap();

        assert_eq!(payload, json!([{ "no": "E1" }]));
    }

    #[tokio::test]
    async fn test_error_status_uses_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/user/search/E404"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "message": "Employee not found" })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemoryTokenStore::with_tokens("A1", None)));
        let err = client.call("/api/v1/user/search/E404", RequestOptions::get()).await.unwrap_err();

        assert_eq!(err, ApiError::Status { status: 404, message: "Employee not found".into() });
    }

    #[tokio::test]
    async fn test_non_json_error_body_uses_fallback_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemoryTokenStore::new()));
        let err = client.call("/dashboard/stats", RequestOptions::get()).await.unwrap_err();

        assert_eq!(err.status(), Some(502));
        assert_eq!(err.message(), MSG_REQUEST_FAILED);
    }

    #[tokio::test]
    async fn test_empty_success_body_is_null() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/cards/C1/deactivate"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemoryTokenStore::with_tokens("A1", None)));
        let payload = client.call("/cards/C1/deactivate", RequestOptions::put()).await.unwrap();

        assert_eq!(payload, Value::Null);
    }

    #[tokio::test]
    async fn test_has_valid_session_accepts_opaque_tokens() {
        let client = ApiClient::builder()
            .token_store(Arc::new(MemoryTokenStore::with_tokens("opaque-token", None)))
            .build()
            .unwrap();

        assert!(client.has_valid_session().await.unwrap());

        client.reset().await.unwrap();
        assert!(!client.has_valid_session().await.unwrap());
    }
}
