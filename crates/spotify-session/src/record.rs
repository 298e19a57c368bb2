//! The per-session token record
//!
//! `expires_at` is an absolute unix timestamp in seconds, computed at write
//! time from the token response's `expires_in` delta. A record is always
//! written whole — construction happens here, and the store replaces the
//! previous record by single assignment.

use std::time::Duration;

use spotify_auth::TokenResponse;

/// One session's OAuth credential.
///
/// Either absent (unauthenticated session) or fully formed: every field is
/// populated, and `refresh_token` carries the previous value when a refresh
/// response omitted one.
#[derive(Debug, Clone)]
pub struct TokenRecord {
    /// Bearer token for resource API calls
    pub access_token: String,
    /// Token for the refresh exchange; retained across refreshes that omit it
    pub refresh_token: String,
    /// Expiry as absolute unix timestamp in seconds
    pub expires_at: u64,
    /// Space-delimited scopes granted by the provider (informational)
    pub scope: String,
}

impl TokenRecord {
    /// Build a record from a token response.
    ///
    /// `expires_at` is recomputed as `issued_at + expires_in` — never copied
    /// from a prior record. When the response omits `refresh_token`,
    /// `fallback_refresh` (the previous record's value) is carried forward.
    /// Returns `None` if no refresh token is available from either source;
    /// such a record could never be refreshed and must not be stored.
    pub fn from_response(
        mut response: TokenResponse,
        issued_at: u64,
        fallback_refresh: Option<String>,
    ) -> Option<Self> {
        let refresh_token = response.refresh_token.take().or(fallback_refresh)?;
        Some(Self {
            access_token: response.access_token,
            refresh_token,
            expires_at: issued_at + response.expires_in,
            scope: response.scope,
        })
    }

    /// Whether the record expires within `margin` of `now`.
    ///
    /// Strict comparison: a record expiring exactly at the margin boundary is
    /// still served as-is.
    pub fn is_expiring(&self, now: u64, margin: Duration) -> bool {
        self.expires_at < now + margin.as_secs()
    }
}

/// Current unix time in seconds.
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
