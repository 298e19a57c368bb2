//! Credential lifecycle manager
//!
//! The only writer of the per-session token record. Every downstream API
//! call obtains its bearer token through `access_token()`, which guarantees
//! the returned token is valid for at least the refresh margin — fresh
//! records are returned with no network call, expiring records are refreshed
//! inline before the token is handed out.
//!
//! Refresh is synchronous and inline rather than background-scheduled: the
//! margin absorbs the latency of the refresh call itself plus clock skew, so
//! staleness is never observable by the caller. A failed refresh ends the
//! session rather than looping — there is no retry anywhere in this module.

use std::sync::Arc;
use std::time::Duration;

use spotify_auth::OAuthConfig;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::record::{TokenRecord, unix_now};
use crate::store::SessionStore;

/// Safety window before expiry within which a credential is refreshed
/// rather than used as-is. Covers the refresh round-trip plus clock skew.
pub const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Single source of truth for "is there a usable credential right now".
pub struct CredentialManager {
    store: Arc<SessionStore>,
    oauth: OAuthConfig,
    http: reqwest::Client,
    margin: Duration,
}

impl CredentialManager {
    pub fn new(store: Arc<SessionStore>, oauth: OAuthConfig, http: reqwest::Client) -> Self {
        Self {
            store,
            oauth,
            http,
            margin: REFRESH_MARGIN,
        }
    }

    /// Override the refresh margin (tests exercise the boundary).
    pub fn with_margin(mut self, margin: Duration) -> Self {
        self.margin = margin;
        self
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Exchange an authorization code and install the resulting record.
    ///
    /// The record is written whole, with `expires_at` computed from the
    /// response's `expires_in` at this moment. Nothing is written on failure.
    pub async fn complete_login(&self, session_id: Uuid, code: &str) -> Result<()> {
        let entry = self
            .store
            .get(session_id)
            .await
            .ok_or(Error::Unauthenticated)?;

        let response = spotify_auth::exchange_code(&self.http, &self.oauth, code)
            .await
            .map_err(|e| Error::Exchange(e.to_string()))?;

        let record = TokenRecord::from_response(response, unix_now(), None)
            .ok_or_else(|| Error::Exchange("token response missing refresh_token".into()))?;

        *entry.record.write().await = Some(record);
        info!(session_id = %session_id.simple(), "login completed, credential stored");
        Ok(())
    }

    /// Return a bearer token valid for at least the refresh margin.
    ///
    /// Fresh record: returned immediately, no network call. Expiring record:
    /// refreshed inline under the per-session gate; the second of two
    /// concurrent expiring-token requests blocks on the gate, re-checks, and
    /// observes the first's result instead of spending the rotated refresh
    /// token again. Any refresh failure clears the record and surfaces as
    /// `Unauthenticated` — callers cannot distinguish it from never having
    /// logged in, because the recovery is the same.
    pub async fn access_token(&self, session_id: Uuid) -> Result<String> {
        let entry = self
            .store
            .get(session_id)
            .await
            .ok_or(Error::Unauthenticated)?;

        {
            let record = entry.record.read().await;
            match record.as_ref() {
                None => return Err(Error::Unauthenticated),
                Some(r) if !r.is_expiring(unix_now(), self.margin) => {
                    return Ok(r.access_token.clone());
                }
                Some(_) => {}
            }
        }

        let _gate = entry.refresh_gate.lock().await;

        // Re-check under the gate: a concurrent request may have refreshed
        // while this one waited.
        let refresh_token = {
            let record = entry.record.read().await;
            match record.as_ref() {
                None => return Err(Error::Unauthenticated),
                Some(r) if !r.is_expiring(unix_now(), self.margin) => {
                    return Ok(r.access_token.clone());
                }
                Some(r) => r.refresh_token.clone(),
            }
        };

        debug!(session_id = %session_id.simple(), "token expiring within margin, refreshing inline");

        match spotify_auth::refresh(&self.http, &self.oauth, &refresh_token).await {
            Ok(response) => {
                // Fallback is always Some here, so from_response cannot fail
                let record =
                    match TokenRecord::from_response(response, unix_now(), Some(refresh_token)) {
                        Some(r) => r,
                        None => return Err(Error::Unauthenticated),
                    };
                let token = record.access_token.clone();
                *entry.record.write().await = Some(record);
                metrics::counter!("session_token_refreshes_total", "outcome" => "success")
                    .increment(1);
                info!(session_id = %session_id.simple(), "inline token refresh succeeded");
                Ok(token)
            }
            Err(e) => {
                warn!(
                    session_id = %session_id.simple(),
                    error = %e,
                    "token refresh failed, clearing session credential"
                );
                *entry.record.write().await = None;
                metrics::counter!("session_token_refreshes_total", "outcome" => "failure")
                    .increment(1);
                Err(Error::Unauthenticated)
            }
        }
    }

    /// Clear the session's credential. Idempotent; never fails.
    pub async fn logout(&self, session_id: Uuid) {
        if let Some(entry) = self.store.get(session_id).await {
            *entry.record.write().await = None;
            info!(session_id = %session_id.simple(), "credential cleared");
        }
    }
}
