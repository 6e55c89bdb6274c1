//! Application constants
//!
//! Centralized location for endpoint paths, storage keys and user-facing
//! fallback messages.

// Storage keys (shared by every token store implementation)
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

// Authentication surface
pub const AUTH_PATH_MARKER: &str = "/auth/";
pub const LOGIN_PATH: &str = "/api/v1/auth/login";
pub const LOGOUT_PATH: &str = "/api/v1/auth/logout";
pub const REFRESH_PATH: &str = "/api/v1/auth/refresh";
pub const PROFILE_PATH: &str = "/api/v1/auth/me";

// Defaults
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REFRESH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

// User-facing messages
pub const MSG_NETWORK_ERROR: &str = "A network error occurred.";
pub const MSG_SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";
pub const MSG_REQUEST_FAILED: &str = "An error occurred while processing the request.";
