//! Spotify OAuth endpoints and default scopes
//!
//! The endpoints live on the accounts host (`accounts.spotify.com`), not the
//! resource API (`api.spotify.com`). The client id/secret are per-application
//! values supplied via configuration, never constants.

/// Authorization endpoint (browser redirect target)
pub const AUTHORIZE_ENDPOINT: &str = "https://accounts.spotify.com/authorize";

/// Token endpoint for code exchange and token refresh
pub const TOKEN_ENDPOINT: &str = "https://accounts.spotify.com/api/token";

/// Scopes the dashboard requests.
/// Read scopes cover profile, library, top items, and listening history;
/// `user-read-playback-state`/`user-modify-playback-state` are required for
/// the player transport endpoints.
pub const SCOPES: &[&str] = &[
    "user-read-private",
    "user-read-email",
    "user-library-read",
    "user-top-read",
    "user-read-recently-played",
    "user-read-playback-state",
    "user-modify-playback-state",
];
