//! Expiry inspection for JWT access tokens.
//!
//! Only the `exp` claim of the payload segment is read; signatures are the
//! backend's business.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

/// Expiry instant carried in the token's `exp` claim.
///
/// Returns `None` for opaque tokens, undecodable payloads, or a missing
/// `exp`.
#[must_use]
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?.as_i64()?;

    Utc.timestamp_opt(exp, 0).single()
}

/// Whether the token is expired at `now`.
///
/// Anything that cannot be read as a JWT with an `exp` claim counts as
/// expired.
#[must_use]
pub fn is_token_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    match token_expiry(token) {
        Some(expires_at) => expires_at < now,
        None => true,
    }
}

/// Whether the token is expired right now.
#[must_use]
pub fn is_token_expired(token: &str) -> bool {
    is_token_expired_at(token, Utc::now())
}
