//! OAuth token exchange and refresh
//!
//! Handles the two token endpoint interactions:
//! 1. Authorization code exchange (login callback)
//! 2. Refresh-token exchange (when a stored credential approaches expiry)
//!
//! Both operations POST a form to the token endpoint with the client id and
//! secret as HTTP Basic credentials. Neither is ever retried: authorization
//! codes are single-use, and a rejected refresh token stays rejected.

use serde::{Deserialize, Serialize};

use crate::config::OAuthConfig;
use crate::error::{Error, Result};

/// Response from the token endpoint for both exchange and refresh.
///
/// `expires_in` is a delta in seconds from the response time. The caller
/// converts this to an absolute unix timestamp when storing the credential —
/// a relative duration must never be trusted across time.
///
/// `refresh_token` is absent on some refresh responses; the caller carries
/// the previous value forward in that case.
#[derive(Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Seconds until the access token expires (delta, not absolute)
    pub expires_in: u64,
    #[serde(default)]
    pub scope: String,
}

/// Exchange an authorization code for tokens (login callback).
///
/// One network call, never retried — authorization codes are single-use, so
/// a retry could only fail differently.
pub async fn exchange_code(
    client: &reqwest::Client,
    config: &OAuthConfig,
    code: &str,
) -> Result<TokenResponse> {
    let response = client
        .post(&config.token_endpoint)
        .basic_auth(&config.client_id, Some(config.client_secret.expose()))
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &config.redirect_uri),
        ])
        .send()
        .await
        .map_err(|e| Error::Http(format!("token exchange request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::Exchange(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| Error::Exchange(format!("invalid token response: {e}")))
}

/// Refresh an access token using a refresh token.
///
/// Called inline by the session layer when a stored credential is about to
/// expire. A 400/401/403 means the refresh token is rotated, revoked, or
/// otherwise dead — `RefreshRejected`, fatal for the session.
pub async fn refresh(
    client: &reqwest::Client,
    config: &OAuthConfig,
    refresh_token: &str,
) -> Result<TokenResponse> {
    let response = client
        .post(&config.token_endpoint)
        .basic_auth(&config.client_id, Some(config.client_secret.expose()))
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .send()
        .await
        .map_err(|e| Error::Http(format!("token refresh request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));

        // 400 (invalid_grant), 401, and 403 all mean the refresh token is dead
        if matches!(status.as_u16(), 400 | 401 | 403) {
            return Err(Error::RefreshRejected(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        return Err(Error::Exchange(format!(
            "token refresh returned {status}: {body}"
        )));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| Error::Exchange(format!("invalid refresh response: {e}")))
}
