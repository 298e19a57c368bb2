//! Error types for OAuth operations

/// Errors from OAuth operations.
///
/// `Exchange` and `RefreshRejected` carry distinct recovery paths: a failed
/// code exchange means the user must restart the login flow; a rejected
/// refresh token means the stored credential is dead and the session must
/// fall back to the unauthenticated state.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("code exchange failed: {0}")]
    Exchange(String),

    #[error("refresh token rejected: {0}")]
    RefreshRejected(String),
}

/// Result alias for OAuth operations.
pub type Result<T> = std::result::Result<T, Error>;
