//! Server-side session store and cookie signing
//!
//! The browser cookie carries only a signed session identifier; token records
//! never leave the process. Entries live in an in-memory map for the lifetime
//! of the process — sessions do not survive a restart, matching the
//! no-persistent-credential-storage policy.
//!
//! Cookie format: `<uuid>.<base64url(sha256(secret || "." || uuid))>`. A
//! value whose signature does not verify is treated as no session at all.

use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use common::Secret;
use sha2::{Digest, Sha256};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::record::TokenRecord;

/// One browser session's server-side state.
///
/// `record` is the only shared mutable credential state in the system; it is
/// replaced by single assignment of a fully constructed record, never mutated
/// field-by-field. `refresh_gate` serializes refresh attempts for this
/// session so only one is ever in flight.
pub struct SessionEntry {
    pub(crate) record: RwLock<Option<TokenRecord>>,
    pub(crate) refresh_gate: Mutex<()>,
    login_state: Mutex<Option<String>>,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            record: RwLock::new(None),
            refresh_gate: Mutex::new(()),
            login_state: Mutex::new(None),
        }
    }

    /// Whether this session currently holds a token record.
    ///
    /// Presence only — the record may still be expiring; `access_token()`
    /// is the validity check.
    pub async fn authenticated(&self) -> bool {
        self.record.read().await.is_some()
    }

    /// Stash the OAuth `state` value between `/login` and `/callback`.
    pub async fn set_login_state(&self, state: String) {
        *self.login_state.lock().await = Some(state);
    }

    /// Consume the stashed `state` value. Single-use: a second callback
    /// with a replayed state finds nothing to match against.
    pub async fn take_login_state(&self) -> Option<String> {
        self.login_state.lock().await.take()
    }
}

/// In-memory session store keyed by session identifier.
///
/// The `CredentialManager` is the sole writer of each entry's token record;
/// the store only creates, looks up, and drops entries, and signs/verifies
/// the cookie values that identify them.
pub struct SessionStore {
    signing_secret: Secret<String>,
    sessions: RwLock<HashMap<Uuid, Arc<SessionEntry>>>,
}

impl SessionStore {
    pub fn new(signing_secret: Secret<String>) -> Self {
        Self {
            signing_secret,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a fresh unauthenticated session.
    pub async fn create(&self) -> (Uuid, Arc<SessionEntry>) {
        let id = Uuid::new_v4();
        let entry = Arc::new(SessionEntry::new());
        self.sessions.write().await.insert(id, entry.clone());
        debug!(session_id = %id.simple(), "session created");
        (id, entry)
    }

    /// Look up a session by identifier.
    pub async fn get(&self, id: Uuid) -> Option<Arc<SessionEntry>> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Drop a session entirely (logout).
    pub async fn remove(&self, id: Uuid) {
        if self.sessions.write().await.remove(&id).is_some() {
            debug!(session_id = %id.simple(), "session removed");
        }
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether any sessions are live.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Signed cookie value for a session identifier.
    pub fn cookie_value(&self, id: Uuid) -> String {
        let id = id.simple().to_string();
        let sig = self.signature(&id);
        format!("{id}.{sig}")
    }

    /// Verify a cookie value and extract the session identifier.
    ///
    /// Returns `None` for malformed values or signature mismatches — a
    /// tampered cookie is indistinguishable from no cookie.
    pub fn verify_cookie(&self, value: &str) -> Option<Uuid> {
        let (id, sig) = value.split_once('.')?;
        if self.signature(id) != sig {
            return None;
        }
        Uuid::parse_str(id).ok()
    }

    /// `base64url(sha256(secret || "." || id))`
    fn signature(&self, id: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.signing_secret.expose().as_bytes());
        hasher.update(b".");
        hasher.update(id.as_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> SessionStore {
        SessionStore::new(Secret::new("test-signing-secret".into()))
    }

    #[tokio::test]
    async fn create_get_remove_roundtrip() {
        let store = test_store();
        let (id, entry) = store.create().await;
        assert!(!entry.authenticated().await);

        let looked_up = store.get(id).await.unwrap();
        assert!(Arc::ptr_eq(&entry, &looked_up));

        store.remove(id).await;
        assert!(store.get(id).await.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn cookie_value_verifies() {
        let store = test_store();
        let (id, _) = store.create().await;

        let cookie = store.cookie_value(id);
        assert_eq!(store.verify_cookie(&cookie), Some(id));
    }

    #[tokio::test]
    async fn tampered_cookie_is_rejected() {
        let store = test_store();
        let (id, _) = store.create().await;
        let (other, _) = store.create().await;

        let cookie = store.cookie_value(id);
        let (_, sig) = cookie.split_once('.').unwrap();

        // Signature from one session id pasted onto another
        let forged = format!("{}.{sig}", other.simple());
        assert_eq!(store.verify_cookie(&forged), None);
    }

    #[tokio::test]
    async fn malformed_cookie_is_rejected() {
        let store = test_store();
        assert_eq!(store.verify_cookie("no-separator"), None);
        assert_eq!(store.verify_cookie(""), None);
        assert_eq!(store.verify_cookie("not-a-uuid.not-a-sig"), None);
    }

    #[tokio::test]
    async fn different_secrets_produce_incompatible_cookies() {
        let store_a = test_store();
        let store_b = SessionStore::new(Secret::new("another-secret".into()));
        let (id, _) = store_a.create().await;

        let cookie = store_a.cookie_value(id);
        assert_eq!(store_b.verify_cookie(&cookie), None);
    }

    #[tokio::test]
    async fn login_state_is_single_use() {
        let store = test_store();
        let (_, entry) = store.create().await;

        entry.set_login_state("state-xyz".into()).await;
        assert_eq!(entry.take_login_state().await.as_deref(), Some("state-xyz"));
        assert_eq!(entry.take_login_state().await, None);
    }
}
