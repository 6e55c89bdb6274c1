//! Token types shared by stores, the refresh coordinator and the HTTP layer.
//!
//! The backend is not consistent about where it puts tokens in a response:
//! refresh answers are sometimes flat and sometimes wrapped in `data`, and
//! login answers nest them one level deeper under `tokens`. All of that is
//! normalized here, in [`RefreshedTokens::from_response_body`], so nothing
//! else has to care.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Access token plus optional refresh token, written to a store together.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    /// `None` means "keep whatever refresh token is already stored".
    #[serde(rename = "refreshToken", default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl TokenPair {
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: Option<&str>) -> Self {
        Self { access_token: access_token.into(), refresh_token: refresh_token.map(String::from) }
    }
}

// Tokens never reach logs, not even through `{:?}`.
impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Canonical outcome of a successful refresh or login exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshedTokens {
    pub access_token: String,
    /// Present when the backend rotated the refresh token.
    pub refresh_token: Option<String>,
}

impl RefreshedTokens {
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: Option<&str>) -> Self {
        Self { access_token: access_token.into(), refresh_token: refresh_token.map(String::from) }
    }

    /// Extract tokens from a backend response body.
    ///
    /// Accepted shapes, in lookup order:
    /// - `{ "data": { "tokens": { "accessToken": … } } }`
    /// - `{ "data": { "accessToken": … } }`
    /// - `{ "tokens": { "accessToken": … } }`
    /// - `{ "accessToken": … }`
    ///
    /// Snake-case keys (`access_token`, `refresh_token`) are accepted too.
    /// Returns `None` when no non-empty access token is found.
    #[must_use]
    pub fn from_response_body(body: &Value) -> Option<Self> {
        let root = body.get("data").filter(|d| d.is_object()).unwrap_or(body);
        let holder = root.get("tokens").filter(|t| t.is_object()).unwrap_or(root);

        let access_token = string_field(holder, "accessToken", "access_token")?;
        let refresh_token = string_field(holder, "refreshToken", "refresh_token");

        Some(Self { access_token, refresh_token })
    }

    /// Pair to persist after this exchange.
    #[must_use]
    pub fn to_pair(&self) -> TokenPair {
        TokenPair::new(self.access_token.clone(), self.refresh_token.as_deref())
    }
}

impl fmt::Debug for RefreshedTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshedTokens")
            .field("access_token", &"<redacted>")
            .field("rotated_refresh_token", &self.refresh_token.is_some())
            .finish()
    }
}

fn string_field(holder: &Value, camel: &str, snake: &str) -> Option<String> {
    holder
        .get(camel)
        .or_else(|| holder.get(snake))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
