//! Error types for session credential operations

/// Errors from session credential operations.
///
/// A rejected refresh is deliberately NOT a distinct variant: the lifecycle
/// manager collapses it into `Unauthenticated`, because the recovery path is
/// identical to never having logged in — restart the login flow. Callers
/// must not be able to distinguish the two.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no usable credential for this session")]
    Unauthenticated,

    #[error("code exchange failed: {0}")]
    Exchange(String),
}

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;
