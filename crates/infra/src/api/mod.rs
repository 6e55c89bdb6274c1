//! Backend API client for the card issuance admin
//!
//! # Architecture
//!
//! - [`ApiClient`] sends every request, attaching the bearer token and
//!   running the refresh-and-replay protocol on `401`
//! - [`HttpRefreshTransport`] performs the refresh exchange for the shared
//!   `RefreshCoordinator`
//! - [`CardIssueCommands`] wraps each backend endpoint with typed inputs
//!   and outputs
//! - [`SessionStatus`] is published on a watch channel so the UI can route
//!   to login when the session ends

pub mod auth;
pub mod client;
pub mod commands;
pub mod errors;
pub mod request;
pub mod session;

pub use auth::HttpRefreshTransport;
pub use client::{ApiClient, ApiClientBuilder};
pub use commands::CardIssueCommands;
pub use errors::{ApiError, ApiErrorCategory, ApiResult};
pub use request::{MultipartBody, RequestBody, RequestOptions};
pub use session::SessionStatus;
