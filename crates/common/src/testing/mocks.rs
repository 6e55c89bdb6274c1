//! Mock implementations of the auth traits
//!
//! Provides mock objects for testing purposes.

// Allow missing error/panic docs for test mocks - they are designed to be simple
// and errors are clearly indicated by their return types
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::auth::{
    RefreshError, RefreshTransport, RefreshedTokens, TokenPair, TokenStore, TokenStoreError,
};

type Script = Arc<Mutex<VecDeque<Result<RefreshedTokens, RefreshError>>>>;

/// Scripted refresh transport
///
/// Replays queued outcomes in order; once the script runs dry the last
/// outcome repeats. Every call is counted and the refresh token it was
/// given is recorded.
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "test-utils")]
/// # {
/// use cardissue_common::testing::MockRefreshTransport;
/// use cardissue_common::{RefreshError, RefreshedTokens};
///
/// let transport = MockRefreshTransport::succeeding(RefreshedTokens::new("A2", None))
///     .then(Err(RefreshError::Transport("offline".into())));
/// assert_eq!(transport.call_count(), 0);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockRefreshTransport {
    script: Script,
    last: Arc<Mutex<Result<RefreshedTokens, RefreshError>>>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<String>>>,
}

impl MockRefreshTransport {
    fn scripted(first: Result<RefreshedTokens, RefreshError>) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            last: Arc::new(Mutex::new(first)),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Transport that always answers with `tokens`
    #[must_use]
    pub fn succeeding(tokens: RefreshedTokens) -> Self {
        Self::scripted(Ok(tokens))
    }

    /// Transport that always fails with `error`
    #[must_use]
    pub fn failing(error: RefreshError) -> Self {
        Self::scripted(Err(error))
    }

    /// Queue another outcome after the current one
    #[must_use]
    pub fn then(self, outcome: Result<RefreshedTokens, RefreshError>) -> Self {
        {
            let mut script = self.script.lock();
            if script.is_empty() {
                script.push_back(self.last.lock().clone());
            }
            script.push_back(outcome.clone());
        }
        *self.last.lock() = outcome;
        self
    }

    /// Hold every call for `delay` before answering
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of refresh calls made so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Refresh tokens received, in call order
    #[must_use]
    pub fn received_tokens(&self) -> Vec<String> {
        self.received.lock().clone()
    }
}

#[async_trait]
impl RefreshTransport for MockRefreshTransport {
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, RefreshError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.received.lock().push(refresh_token.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.script.lock().pop_front();
        next.unwrap_or_else(|| self.last.lock().clone())
    }
}

/// Token store whose writes always fail
///
/// Reads return the pair it was created with.
#[derive(Debug, Clone)]
pub struct FailingTokenStore {
    access: Option<String>,
    refresh: Option<String>,
}

impl FailingTokenStore {
    /// Create a store that reports `access`/`refresh` but rejects writes
    #[must_use]
    pub fn new(access: Option<&str>, refresh: Option<&str>) -> Self {
        Self { access: access.map(String::from), refresh: refresh.map(String::from) }
    }

    fn write_error() -> TokenStoreError {
        TokenStoreError::Io(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"))
    }
}

#[async_trait]
impl TokenStore for FailingTokenStore {
    async fn access_token(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.access.clone())
    }

    async fn refresh_token(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.refresh.clone())
    }

    async fn store_pair(&self, _pair: &TokenPair) -> Result<(), TokenStoreError> {
        Err(Self::write_error())
    }

    async fn clear(&self) -> Result<(), TokenStoreError> {
        Err(Self::write_error())
    }
}
