//! Testing utilities
//!
//! - **[`mocks`]**: scripted [`RefreshTransport`](crate::auth::RefreshTransport)
//!   and [`TokenStore`](crate::auth::TokenStore) doubles
//!
//! ## Usage
//!
//! ```rust
//! # #[cfg(feature = "test-utils")]
//! # {
//! use cardissue_common::testing::MockRefreshTransport;
//! use cardissue_common::RefreshedTokens;
//!
//! let transport = MockRefreshTransport::succeeding(RefreshedTokens::new("A2", Some("R2")));
//! assert_eq!(transport.call_count(), 0);
//! # }
//! ```

pub mod mocks;

pub use mocks::{FailingTokenStore, MockRefreshTransport};
