//! Session cookie parsing and construction
//!
//! The cookie carries only the signed session identifier; everything else
//! lives server-side. HttpOnly keeps it away from page scripts, SameSite=Lax
//! limits cross-site sends while still allowing the OAuth redirect back from
//! the accounts host.

use axum::http::HeaderMap;
use spotify_session::SessionStore;
use uuid::Uuid;

/// Session cookie name
pub const SESSION_COOKIE: &str = "spotify_dashboard_session";

/// Extract a named cookie's value from the Cookie header.
pub fn get_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    for pair in header.split(';') {
        if let Some((key, value)) = pair.trim().split_once('=')
            && key == name
        {
            return Some(value.to_string());
        }
    }
    None
}

/// Resolve the request's session identifier: parse the cookie, verify the
/// signature. Tampered or absent cookies both yield `None`.
pub fn session_id(headers: &HeaderMap, store: &SessionStore) -> Option<Uuid> {
    get_cookie_value(headers, SESSION_COOKIE).and_then(|value| store.verify_cookie(&value))
}

/// Set-Cookie value installing a session.
pub fn set_session_cookie(value: &str) -> String {
    format!("{SESSION_COOKIE}={value}; HttpOnly; Path=/; SameSite=Lax")
}

/// Set-Cookie value expiring the session cookie (logout).
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0")
}
