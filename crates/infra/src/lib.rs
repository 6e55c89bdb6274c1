//! # Card Issuance Infrastructure
//!
//! HTTP plumbing for the staff ID card issuance admin client.
//!
//! This crate contains:
//! - The authenticated API client with single-flight token refresh
//! - Typed wrappers for every backend endpoint
//! - Configuration loading from environment and files
//! - Tracing subscriber setup
//!
//! ## Architecture
//! - Depends on `cardissue-domain` for DTOs and configuration
//! - Depends on `cardissue-common` for token storage and refresh
//!   coordination
//! - Contains all network I/O

pub mod api;
pub mod config;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use api::{
    ApiClient, ApiClientBuilder, ApiError, ApiErrorCategory, ApiResult, CardIssueCommands,
    HttpRefreshTransport, MultipartBody, RequestBody, RequestOptions, SessionStatus,
};
pub use http::{HttpClient, HttpClientBuilder};
