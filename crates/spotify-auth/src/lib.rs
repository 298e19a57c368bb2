//! Spotify OAuth authentication library
//!
//! Stateless translator between the dashboard and Spotify's OAuth2
//! authorization-code contract. This crate is a standalone library with no
//! dependency on the dashboard binary — it can be tested and used
//! independently.
//!
//! Credential flow:
//! 1. Dashboard calls `authorize::generate_state()` and stashes it in the session
//! 2. User authorizes via `authorize::authorize_url()`
//! 3. Dashboard calls `token::exchange_code()` with the authorization code
//! 4. The session layer stores the resulting token record
//! 5. When the record approaches expiry, the session layer calls `token::refresh()`

pub mod authorize;
pub mod config;
pub mod constants;
pub mod error;
pub mod token;

pub use authorize::{authorize_url, generate_state};
pub use config::OAuthConfig;
pub use constants::*;
pub use error::{Error, Result};
pub use token::{TokenResponse, exchange_code, refresh};
