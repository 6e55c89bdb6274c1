//! Traits for token persistence and refresh transport
//!
//! These traits decouple the refresh state machine from where tokens live
//! and from how the refresh endpoint is reached, so both can be swapped in
//! tests.

use async_trait::async_trait;

use super::refresh::RefreshError;
use super::store::TokenStoreError;
use super::types::{RefreshedTokens, TokenPair};

/// Keyed storage for the access/refresh token pair.
///
/// Both values live under fixed keys and are cleared together.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Current access token, if any.
    async fn access_token(&self) -> Result<Option<String>, TokenStoreError>;

    /// Current refresh token, if any.
    async fn refresh_token(&self) -> Result<Option<String>, TokenStoreError>;

    /// Replace the stored pair.
    ///
    /// When `pair.refresh_token` is `None` the stored refresh token is kept.
    ///
    /// # Errors
    /// Returns error if the backing storage cannot be written
    async fn store_pair(&self, pair: &TokenPair) -> Result<(), TokenStoreError>;

    /// Remove both tokens. Idempotent.
    ///
    /// # Errors
    /// Returns error if the backing storage cannot be written
    async fn clear(&self) -> Result<(), TokenStoreError>;
}

/// Performs the network exchange of a refresh token for new tokens.
#[async_trait]
pub trait RefreshTransport: Send + Sync {
    /// Exchange `refresh_token` for a new access token (and possibly a
    /// rotated refresh token).
    ///
    /// # Errors
    /// Returns [`RefreshError::Rejected`] for a non-success status,
    /// [`RefreshError::Transport`] when no response arrived and
    /// [`RefreshError::InvalidResponse`] when the body carries no token.
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, RefreshError>;
}
