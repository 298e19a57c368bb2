//! OAuth client configuration
//!
//! Built once at process start from environment configuration and shared
//! immutably afterwards. No mutable client state is held anywhere — each
//! token operation takes the config by reference.

use common::Secret;

use crate::constants::{AUTHORIZE_ENDPOINT, TOKEN_ENDPOINT};

/// Immutable OAuth client configuration.
///
/// Endpoint URLs default to the Spotify accounts host and are overridable so
/// tests can point at a local mock server.
#[derive(Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub redirect_uri: String,
    scope: String,
    pub authorize_endpoint: String,
    pub token_endpoint: String,
}

impl OAuthConfig {
    /// Build a config with the given identity and scope set.
    ///
    /// Scopes are deduplicated preserving first-seen order and joined with
    /// spaces, the separator the authorize endpoint expects.
    pub fn new(
        client_id: String,
        client_secret: Secret<String>,
        redirect_uri: String,
        scopes: &[&str],
    ) -> Self {
        let mut seen: Vec<&str> = Vec::new();
        for &scope in scopes {
            if !seen.contains(&scope) {
                seen.push(scope);
            }
        }
        Self {
            client_id,
            client_secret,
            redirect_uri,
            scope: seen.join(" "),
            authorize_endpoint: AUTHORIZE_ENDPOINT.to_string(),
            token_endpoint: TOKEN_ENDPOINT.to_string(),
        }
    }

    /// Override the endpoint URLs (tests point these at a mock server).
    pub fn with_endpoints(mut self, authorize: String, token: String) -> Self {
        self.authorize_endpoint = authorize;
        self.token_endpoint = token;
        self
    }

    /// Space-delimited scope string.
    pub fn scope(&self) -> &str {
        &self.scope
    }
}
