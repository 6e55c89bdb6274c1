//! Bearer-token session infrastructure
//!
//! This module holds everything the HTTP layer needs to keep a session
//! alive: where the two tokens live, how an expired access token is
//! exchanged for a fresh one, and how concurrent callers share that single
//! exchange.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  RefreshCoordinator  │  Single-flight refresh state machine
//! └──────────┬───────────┘
//!            │
//!            ├──► TokenStore        (memory / file / keychain persistence)
//!            │
//!            └──► RefreshTransport  (HTTP exchange, provided by the caller)
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use async_trait::async_trait;
//! use cardissue_common::auth::{
//!     MemoryTokenStore, RefreshCoordinator, RefreshError, RefreshTransport, RefreshedTokens,
//! };
//!
//! struct Backend;
//!
//! #[async_trait]
//! impl RefreshTransport for Backend {
//!     async fn refresh(&self, _refresh_token: &str) -> Result<RefreshedTokens, RefreshError> {
//!         Ok(RefreshedTokens::new("fresh-access", None))
//!     }
//! }
//!
//! # async fn run() -> Result<(), RefreshError> {
//! let store = Arc::new(MemoryTokenStore::with_tokens("stale", Some("r-1")));
//! let coordinator = RefreshCoordinator::new(store, Arc::new(Backend), Duration::from_secs(30));
//!
//! let access = coordinator.refresh().await?;
//! assert_eq!(access, "fresh-access");
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - **[`types`]**: `TokenPair`, `RefreshedTokens` and the tolerant body parser
//! - **[`traits`]**: `TokenStore` and `RefreshTransport` seams
//! - **[`store`]**: in-memory and file-backed stores
//! - **[`refresh`]**: the single-flight `RefreshCoordinator`
//! - **[`jwt`]**: expiry inspection for JWT access tokens

pub mod jwt;
#[cfg(feature = "platform")]
mod keychain;
pub mod refresh;
pub mod store;
pub mod traits;
pub mod types;

pub use jwt::{is_token_expired, token_expiry};
#[cfg(feature = "platform")]
pub use keychain::KeychainTokenStore;
pub use refresh::{RefreshCoordinator, RefreshError};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStoreError};
pub use traits::{RefreshTransport, TokenStore};
pub use types::{RefreshedTokens, TokenPair};
