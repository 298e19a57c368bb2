//! Authorization URL construction and CSRF state generation
//!
//! The `state` value is generated here, stashed in the session before the
//! redirect, and compared against the value Spotify echoes back in the
//! callback. A mismatch aborts the login.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngExt;

use crate::config::OAuthConfig;

/// Generate a cryptographically random `state` value.
///
/// 32 random bytes encoded as URL-safe base64 (no padding) — opaque to the
/// authorization server, which returns it unchanged in the callback.
pub fn generate_state() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Build the full authorization URL with all required OAuth parameters.
///
/// Deterministic for a given config and state; no side effects, no network.
pub fn authorize_url(config: &OAuthConfig, state: &str) -> String {
    format!(
        "{}?client_id={}&response_type=code&redirect_uri={}&scope={}&state={}",
        config.authorize_endpoint,
        config.client_id,
        urlencoded(&config.redirect_uri),
        urlencoded(config.scope()),
        state,
    )
}

/// Minimal URL encoding for parameter values.
/// Only encodes characters that would break URL parameter parsing.
fn urlencoded(s: &str) -> String {
    s.replace(' ', "%20")
        .replace(':', "%3A")
        .replace('/', "%2F")
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Secret;

    fn test_config() -> OAuthConfig {
        OAuthConfig::new(
            "client-123".into(),
            Secret::new("secret-456".into()),
            "http://localhost:8888/callback".into(),
            &["user-top-read", "user-library-read"],
        )
    }

    #[test]
    fn state_is_url_safe_base64() {
        let state = generate_state();
        // 32 bytes → 43 base64url chars (no padding)
        assert_eq!(state.len(), 43);
        assert!(
            state
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
            "state must be URL-safe base64 (no padding): {state}"
        );
    }

    #[test]
    fn states_are_unique() {
        let a = generate_state();
        let b = generate_state();
        assert_ne!(a, b, "two state values must not collide");
    }

    #[test]
    fn authorization_url_contains_required_params() {
        let config = test_config();
        let url = authorize_url(&config, "state-abc");

        assert!(url.starts_with(&config.authorize_endpoint));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8888%2Fcallback"));
        assert!(url.contains("scope=user-top-read%20user-library-read"));
        assert!(url.contains("state=state-abc"));
    }

    #[test]
    fn authorization_url_is_deterministic() {
        let config = test_config();
        assert_eq!(
            authorize_url(&config, "s"),
            authorize_url(&config, "s"),
            "same config and state must produce the same URL"
        );
    }
}
