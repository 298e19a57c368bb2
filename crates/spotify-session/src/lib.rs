//! Session-scoped credential lifecycle
//!
//! Owns the per-session token record: acquires it on login, validates it on
//! every downstream call, refreshes it inline when it approaches expiry, and
//! replaces it atomically. The `CredentialManager` is the single source of
//! truth for "is there a usable credential right now" and the only writer of
//! the record.
//!
//! Session lifecycle:
//! 1. `/login` calls `SessionStore::create()` → signed cookie value
//! 2. `/callback` calls `CredentialManager::complete_login()` → record written
//! 3. Every API call goes through `CredentialManager::access_token()`
//! 4. A token expiring within the 60-second margin is refreshed inline,
//!    serialized per session so concurrent requests never race a refresh
//! 5. `/logout` (or a rejected refresh) clears the record

pub mod error;
pub mod manager;
pub mod record;
pub mod store;

pub use error::{Error, Result};
pub use manager::{CredentialManager, REFRESH_MARGIN};
pub use record::TokenRecord;
pub use store::{SessionEntry, SessionStore};
