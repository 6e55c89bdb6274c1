//! Token storage in the platform keychain.
//!
//! Both tokens live in one credential under the service name, serialized as
//! the same JSON object the file store writes. Replacing the pair is a single
//! keychain write, so a reader never sees a new access token next to an old
//! refresh token.

use async_trait::async_trait;
use keyring::Entry;
use tracing::debug;

use super::store::{StoredTokens, TokenStoreError};
use super::traits::TokenStore;
use super::types::TokenPair;

const SESSION_ACCOUNT: &str = "session";

/// Keychain-backed token store
pub struct KeychainTokenStore {
    service: String,
    entry: Entry,
}

impl KeychainTokenStore {
    /// Open the keychain entry for `service`.
    ///
    /// # Errors
    /// Returns error if the platform keychain rejects the entry name
    pub fn new(service: impl Into<String>) -> Result<Self, TokenStoreError> {
        let service = service.into();
        let entry = Entry::new(&service, SESSION_ACCOUNT).map_err(keychain_error)?;

        Ok(Self { service, entry })
    }

    fn load(&self) -> Result<StoredTokens, TokenStoreError> {
        match self.entry.get_password() {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(keyring::Error::NoEntry) => Ok(StoredTokens::default()),
            Err(err) => Err(keychain_error(err)),
        }
    }
}

impl std::fmt::Debug for KeychainTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeychainTokenStore").field("service", &self.service).finish()
    }
}

#[async_trait]
impl TokenStore for KeychainTokenStore {
    async fn access_token(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.load()?.access_token)
    }

    async fn refresh_token(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.load()?.refresh_token)
    }

    async fn store_pair(&self, pair: &TokenPair) -> Result<(), TokenStoreError> {
        debug!(service = %self.service, "Storing token pair in keychain");

        let mut tokens = self.load()?;
        tokens.apply(pair);
        self.entry.set_password(&serde_json::to_string(&tokens)?).map_err(keychain_error)
    }

    async fn clear(&self) -> Result<(), TokenStoreError> {
        debug!(service = %self.service, "Clearing keychain tokens");

        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(keychain_error(err)),
        }
    }
}

fn keychain_error(err: keyring::Error) -> TokenStoreError {
    TokenStoreError::Keychain(err.to_string())
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::keychain, run against keyring's mock backend.
    use super::*;

    fn mock_store() -> KeychainTokenStore {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
        KeychainTokenStore::new("CardIssueTest.tokens").unwrap()
    }

    #[tokio::test]
    async fn empty_keychain_reads_as_none() {
        let store = mock_store();

        assert!(store.access_token().await.unwrap().is_none());
        assert!(store.refresh_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stores_and_clears_pair() {
        let store = mock_store();

        store.store_pair(&TokenPair::new("A1", Some("R1"))).await.unwrap();
        store.store_pair(&TokenPair::new("A2", None)).await.unwrap();

        assert_eq!(store.access_token().await.unwrap().as_deref(), Some("A2"));
        assert_eq!(store.refresh_token().await.unwrap().as_deref(), Some("R1"));

        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert!(store.access_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn pair_is_one_json_credential() {
        let store = mock_store();

        store.store_pair(&TokenPair::new("A1", Some("R1"))).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&store.entry.get_password().unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({ "accessToken": "A1", "refreshToken": "R1" }));
    }

    #[tokio::test]
    async fn failed_update_keeps_previous_pair() {
        let store = mock_store();
        store.store_pair(&TokenPair::new("A1", Some("R1"))).await.unwrap();

        let mock: &keyring::mock::MockCredential =
            store.entry.get_credential().downcast_ref().unwrap();
        mock.set_error(keyring::Error::PlatformFailure("locked".into()));

        assert!(store.store_pair(&TokenPair::new("A2", Some("R2"))).await.is_err());
        assert_eq!(store.access_token().await.unwrap().as_deref(), Some("A1"));
        assert_eq!(store.refresh_token().await.unwrap().as_deref(), Some("R1"));
    }
}
