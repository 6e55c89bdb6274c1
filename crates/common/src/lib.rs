//! Shared building blocks for the card issuance client.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - default: token types, token stores, refresh coordination, JWT inspection
//! - `platform`: platform keychain token storage
//! - `test-utils`: mock refresh transports for downstream tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

pub use auth::{
    RefreshCoordinator, RefreshError, RefreshTransport, RefreshedTokens, TokenPair, TokenStore,
    TokenStoreError,
};
