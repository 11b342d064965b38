//! Persisted sessions.
//!
//! A signed-in session survives restarts: on the web it lives in
//! `localStorage` under [`SessionStorage::KEY`], natively in
//! `<data_dir>/localhelp/session.json`. Storage failures are logged and never
//! surface to the user; the worst case is signing in again.

use std::fmt;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use store::{AccessToken, Principal};

/// Tokens and identity of a signed-in session.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: AccessToken,
    pub refresh_token: String,
    /// Expiry of `access_token`, in Unix seconds.
    pub expires_at: i64,
    pub user_id: String,
    pub email: String,
}

impl StoredSession {
    pub fn principal(&self) -> Principal {
        Principal::new(&self.user_id, &self.email, self.access_token.clone())
    }

    /// Whether the access token expires before `now + margin_secs`.
    pub fn expires_within(&self, now: i64, margin_secs: i64) -> bool {
        self.expires_at <= now + margin_secs
    }
}

impl fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredSession")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Where a [`StoredSession`] is kept between runs.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStorage {
    #[cfg(not(target_arch = "wasm32"))]
    File(PathBuf),
    #[cfg(target_arch = "wasm32")]
    LocalStorage,
    /// Nothing is persisted.
    Ephemeral,
}

impl SessionStorage {
    /// `localStorage` key on the web.
    pub const KEY: &'static str = "localhelp.session";

    pub fn platform_default() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            SessionStorage::LocalStorage
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            match dirs::data_dir() {
                Some(dir) => SessionStorage::File(dir.join("localhelp").join("session.json")),
                None => {
                    tracing::warn!("no data directory; sessions will not persist");
                    SessionStorage::Ephemeral
                }
            }
        }
    }

    pub fn load(&self) -> Option<StoredSession> {
        let raw = self.read_raw()?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!("discarding unreadable stored session: {e}");
                self.clear();
                None
            }
        }
    }

    pub fn save(&self, session: &StoredSession) {
        let raw = match serde_json::to_string(session) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("could not encode session: {e}");
                return;
            }
        };
        self.write_raw(&raw);
    }

    pub fn clear(&self) {
        match self {
            #[cfg(not(target_arch = "wasm32"))]
            SessionStorage::File(path) => {
                if let Err(e) = std::fs::remove_file(path) {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!("could not remove {}: {e}", path.display());
                    }
                }
            }
            #[cfg(target_arch = "wasm32")]
            SessionStorage::LocalStorage => {
                if let Some(storage) = local_storage() {
                    let _ = storage.remove_item(Self::KEY);
                }
            }
            SessionStorage::Ephemeral => {}
        }
    }

    fn read_raw(&self) -> Option<String> {
        match self {
            #[cfg(not(target_arch = "wasm32"))]
            SessionStorage::File(path) => std::fs::read_to_string(path).ok(),
            #[cfg(target_arch = "wasm32")]
            SessionStorage::LocalStorage => local_storage()?.get_item(Self::KEY).ok()?,
            SessionStorage::Ephemeral => None,
        }
    }

    fn write_raw(&self, raw: &str) {
        match self {
            #[cfg(not(target_arch = "wasm32"))]
            SessionStorage::File(path) => {
                if let Some(parent) = path.parent() {
                    let _ = std::fs::create_dir_all(parent);
                }
                if let Err(e) = std::fs::write(path, raw) {
                    tracing::warn!("could not persist session to {}: {e}", path.display());
                }
            }
            #[cfg(target_arch = "wasm32")]
            SessionStorage::LocalStorage => {
                let stored = local_storage().map(|s| s.set_item(Self::KEY, raw));
                if !matches!(stored, Some(Ok(()))) {
                    tracing::warn!("could not persist session to localStorage");
                }
            }
            SessionStorage::Ephemeral => {}
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

/// Current time in Unix seconds.
pub fn now_unix() -> i64 {
    #[cfg(target_arch = "wasm32")]
    {
        (js_sys::Date::now() / 1000.0) as i64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StoredSession {
        StoredSession {
            access_token: AccessToken::new("jwt-abc"),
            refresh_token: "refresh-xyz".to_string(),
            expires_at: 10_000,
            user_id: "u1".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SessionStorage::File(dir.path().join("nested").join("session.json"));
        assert!(storage.load().is_none());

        storage.save(&sample());
        assert_eq!(storage.load(), Some(sample()));

        storage.clear();
        assert!(storage.load().is_none());
        // Clearing twice is harmless.
        storage.clear();
    }

    #[test]
    fn test_corrupt_file_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let storage = SessionStorage::File(path.clone());
        assert!(storage.load().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_ephemeral_keeps_nothing() {
        let storage = SessionStorage::Ephemeral;
        storage.save(&sample());
        assert!(storage.load().is_none());
    }

    #[test]
    fn test_expiry_margin() {
        let session = sample();
        assert!(!session.expires_within(9_000, 60));
        assert!(session.expires_within(9_950, 60));
        assert!(session.expires_within(10_001, 0));
    }

    #[test]
    fn test_debug_hides_tokens() {
        let shown = format!("{:?}", sample());
        assert!(!shown.contains("jwt-abc"));
        assert!(!shown.contains("refresh-xyz"));
        assert_eq!(sample().principal().id, "u1");
    }
}
