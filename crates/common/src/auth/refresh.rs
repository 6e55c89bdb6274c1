//! Single-flight access-token refresh
//!
//! Manages the refresh episode lifecycle:
//! - `Idle → Refreshing` is claimed synchronously by the first caller
//! - Callers arriving while `Refreshing` queue a waiter instead of calling out
//! - The episode settles once: every waiter gets the same outcome, in FIFO
//!   order, and the state returns to `Idle`
//!
//! Exactly one [`RefreshTransport::refresh`] call happens per episode no
//! matter how many callers asked for it.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::traits::{RefreshTransport, TokenStore};

/// Error type for refresh episodes
///
/// Cloned into every waiter of a failed episode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    /// No refresh token stored; no network call was made
    #[error("No refresh token available")]
    NoRefreshToken,

    /// Refresh endpoint answered with a non-success status
    #[error("Refresh rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// No response arrived (connect, DNS, I/O)
    #[error("Refresh transport failed: {0}")]
    Transport(String),

    /// Success status but no usable access token in the body
    #[error("Refresh response unusable: {0}")]
    InvalidResponse(String),

    /// Refresh call exceeded the configured bound
    #[error("Refresh timed out after {0:?}")]
    Timeout(Duration),

    /// Tokens could not be read or persisted
    #[error("Token store failed: {0}")]
    Store(String),

    /// The caller driving the refresh went away before it settled
    #[error("Refresh abandoned before completion")]
    Abandoned,
}

type Outcome = Result<String, RefreshError>;
type Waiter = oneshot::Sender<Outcome>;

enum RefreshState {
    Idle,
    Refreshing { waiters: Vec<Waiter> },
}

/// Coordinates refreshes so concurrent callers share one network exchange.
pub struct RefreshCoordinator {
    store: Arc<dyn TokenStore>,
    transport: Arc<dyn RefreshTransport>,
    state: Mutex<RefreshState>,
    timeout: Duration,
}

impl RefreshCoordinator {
    /// Create a new coordinator
    ///
    /// # Arguments
    /// * `store` - Where the token pair is read from and written to
    /// * `transport` - Performs the refresh round-trip
    /// * `timeout` - Upper bound on a single refresh round-trip
    #[must_use]
    pub fn new(
        store: Arc<dyn TokenStore>,
        transport: Arc<dyn RefreshTransport>,
        timeout: Duration,
    ) -> Self {
        Self { store, transport, state: Mutex::new(RefreshState::Idle), timeout }
    }

    /// Obtain a fresh access token.
    ///
    /// Starts a refresh episode, or joins the one already in flight. A joined
    /// caller whose episode was abandoned by its leader tries once more,
    /// starting or joining a new episode.
    ///
    /// # Errors
    /// Returns the episode's failure. Joined callers receive a clone of the
    /// same error the leading caller sees.
    pub async fn refresh(&self) -> Result<String, RefreshError> {
        let mut rejoined = false;

        loop {
            let Some(joined) = self.claim_or_join() else {
                let mut episode = Episode { coordinator: self, settled: false };
                let outcome = self.exchange().await;
                episode.settle(&outcome);
                return outcome;
            };

            match joined.await.unwrap_or(Err(RefreshError::Abandoned)) {
                Err(RefreshError::Abandoned) if !rejoined => {
                    debug!("In-flight token refresh abandoned; retrying once");
                    rejoined = true;
                }
                outcome => return outcome,
            }
        }
    }

    /// Claim the episode (`None`) or queue behind the running one.
    ///
    /// The lock is released before returning; nothing awaits while it is held.
    fn claim_or_join(&self) -> Option<oneshot::Receiver<Outcome>> {
        let mut state = self.state.lock();
        match &mut *state {
            RefreshState::Idle => {
                *state = RefreshState::Refreshing { waiters: Vec::new() };
                None
            }
            RefreshState::Refreshing { waiters } => {
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                debug!(queued = waiters.len(), "Joined in-flight token refresh");
                Some(rx)
            }
        }
    }

    /// Refresh timeout in effect.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn exchange(&self) -> Outcome {
        let refresh_token = self
            .store
            .refresh_token()
            .await
            .map_err(|e| RefreshError::Store(e.to_string()))?
            .ok_or(RefreshError::NoRefreshToken)?;

        info!("Refreshing access token");

        let refreshed =
            match tokio::time::timeout(self.timeout, self.transport.refresh(&refresh_token)).await
            {
                Ok(result) => result?,
                Err(_) => return Err(RefreshError::Timeout(self.timeout)),
            };

        self.store
            .store_pair(&refreshed.to_pair())
            .await
            .map_err(|e| RefreshError::Store(e.to_string()))?;

        info!(rotated = refreshed.refresh_token.is_some(), "Access token refreshed");
        Ok(refreshed.access_token)
    }

    fn settle(&self, outcome: &Outcome) {
        let previous = std::mem::replace(&mut *self.state.lock(), RefreshState::Idle);

        let RefreshState::Refreshing { waiters } = previous else {
            return;
        };

        match outcome {
            Ok(_) => debug!(waiters = waiters.len(), "Token refresh settled"),
            Err(err) => warn!(waiters = waiters.len(), error = %err, "Token refresh failed"),
        }

        for waiter in waiters {
            // A waiter whose caller was dropped simply misses the result.
            let _ = waiter.send(outcome.clone());
        }
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator").field("timeout", &self.timeout).finish()
    }
}

/// Settles the episode on every exit path of the leading caller.
struct Episode<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl Episode<'_> {
    fn settle(&mut self, outcome: &Outcome) {
        self.settled = true;
        self.coordinator.settle(outcome);
    }
}

impl Drop for Episode<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.coordinator.settle(&Err(RefreshError::Abandoned));
        }
    }
}
