//! API-specific error types
//!
//! Every failed call resolves to one of these. [`ApiError::message`] turns
//! any of them into text fit to show the operator.

use cardissue_common::TokenStoreError;
use cardissue_domain::constants::{MSG_NETWORK_ERROR, MSG_REQUEST_FAILED, MSG_SESSION_EXPIRED};
use cardissue_domain::CardIssueError;
use thiserror::Error;

/// Result of every API call.
pub type ApiResult<T> = Result<T, ApiError>;

/// Categories of API errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Session is gone or the server refused the credentials (401, 403)
    Authentication,
    /// Server errors (5xx) or unusable success bodies
    Server,
    /// Client errors (4xx except auth)
    Client,
    /// No response arrived
    Network,
    /// Local misconfiguration or token storage failures
    Local,
}

/// API operation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Session expired")]
    SessionExpired,

    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Token storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Get the error category for this error
    #[must_use]
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::SessionExpired | Self::Status { status: 401 | 403, .. } => {
                ApiErrorCategory::Authentication
            }
            Self::Status { status, .. } if *status >= 500 => ApiErrorCategory::Server,
            Self::Status { .. } => ApiErrorCategory::Client,
            Self::Serialization(_) => ApiErrorCategory::Server,
            Self::Network(_) => ApiErrorCategory::Network,
            Self::Storage(_) | Self::Config(_) => ApiErrorCategory::Local,
        }
    }

    /// User-facing message for this failure.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Network(_) => MSG_NETWORK_ERROR,
            Self::SessionExpired => MSG_SESSION_EXPIRED,
            Self::Status { message, .. } => message.as_str(),
            Self::Serialization(_) | Self::Storage(_) | Self::Config(_) => MSG_REQUEST_FAILED,
        }
    }

    /// HTTP status carried by the failure, if the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }
}

impl From<CardIssueError> for ApiError {
    fn from(err: CardIssueError) -> Self {
        match err {
            CardIssueError::Network(message) => Self::Network(message),
            CardIssueError::Config(message) | CardIssueError::InvalidInput(message) => {
                Self::Config(message)
            }
        }
    }
}

impl From<TokenStoreError> for ApiError {
    fn from(err: TokenStoreError) -> Self {
        Self::Storage(err.to_string())
    }
}
