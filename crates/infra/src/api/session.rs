//! Observable session state.

use serde::Serialize;

/// Where the current session stands.
///
/// Published on a `tokio::sync::watch` channel by
/// [`ApiClient`](super::ApiClient). UI layers subscribe and route to the
/// login screen on [`SessionStatus::Expired`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No login has happened in this process.
    Anonymous,
    /// Tokens were obtained by login, restore or refresh.
    Authenticated,
    /// A refresh failed and the tokens were discarded.
    Expired,
    /// The operator logged out.
    LoggedOut,
}

impl SessionStatus {
    #[must_use]
    pub fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated)
    }

    /// Whether the operator has to sign in again.
    #[must_use]
    pub fn requires_login(self) -> bool {
        !self.is_authenticated()
    }
}
