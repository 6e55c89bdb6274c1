//! Token store implementations.
//!
//! - [`MemoryTokenStore`]: process-local, lost on exit.
//! - [`FileTokenStore`]: a small JSON document keyed by `accessToken` and
//!   `refreshToken`, surviving restarts the way browser local storage does.
//!
//! The platform keychain store lives in `auth::keychain` behind the
//! `platform` feature.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use super::traits::TokenStore;
use super::types::TokenPair;

/// Error type for token store operations
#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("Token store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token store contents are malformed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keychain(String),
}

/// Persisted form shared by the file and keychain stores.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub(crate) struct StoredTokens {
    #[serde(rename = "accessToken", default, skip_serializing_if = "Option::is_none")]
    pub(crate) access_token: Option<String>,
    #[serde(rename = "refreshToken", default, skip_serializing_if = "Option::is_none")]
    pub(crate) refresh_token: Option<String>,
}

impl StoredTokens {
    pub(crate) fn apply(&mut self, pair: &TokenPair) {
        self.access_token = Some(pair.access_token.clone());
        if let Some(refresh) = &pair.refresh_token {
            self.refresh_token = Some(refresh.clone());
        }
    }
}

/// In-memory token store
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<StoredTokens>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a session.
    #[must_use]
    pub fn with_tokens(access_token: impl Into<String>, refresh_token: Option<&str>) -> Self {
        Self {
            tokens: RwLock::new(StoredTokens {
                access_token: Some(access_token.into()),
                refresh_token: refresh_token.map(String::from),
            }),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn access_token(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.tokens.read().access_token.clone())
    }

    async fn refresh_token(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.tokens.read().refresh_token.clone())
    }

    async fn store_pair(&self, pair: &TokenPair) -> Result<(), TokenStoreError> {
        self.tokens.write().apply(pair);
        Ok(())
    }

    async fn clear(&self) -> Result<(), TokenStoreError> {
        *self.tokens.write() = StoredTokens::default();
        Ok(())
    }
}

/// JSON file token store
///
/// Every read goes to disk so several client instances pointed at the same
/// file observe each other's rotations. Writes go through a temporary file
/// and a rename.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<StoredTokens, TokenStoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(StoredTokens::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(StoredTokens::default()),
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, tokens: &StoredTokens) -> Result<(), TokenStoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(tokens)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn access_token(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.load().await?.access_token)
    }

    async fn refresh_token(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.load().await?.refresh_token)
    }

    async fn store_pair(&self, pair: &TokenPair) -> Result<(), TokenStoreError> {
        let _guard = self.write_lock.lock().await;

        let mut tokens = self.load().await?;
        tokens.apply(pair);
        self.save(&tokens).await?;

        debug!(path = %self.path.display(), "Token pair persisted");
        Ok(())
    }

    async fn clear(&self) -> Result<(), TokenStoreError> {
        let _guard = self.write_lock.lock().await;

        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "Token file removed");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
