//! # Session Store
//!
//! Durable record of the current bearer token, its validity window, and a
//! minimal user summary for rendering before the profile is fetched.
//!
//! ## Liveness
//!
//! A session is live iff a non-empty token is stored AND the current time
//! is strictly before the stored expiry. The token is opaque: nothing here
//! decodes or verifies it.
//!
//! ## Failure semantics
//!
//! Storage is best-effort. Any error from the underlying
//! [`SessionStorage`] is logged and swallowed; a failed read behaves as
//! "no session" so callers never crash on a broken persistence medium.
//! A persist whose token or expiry write fails clears the session rather
//! than pairing an old token with a new expiry.
//!
//! ## Concurrency
//!
//! Writes are plain key overwrites with last-write-wins semantics. The only
//! writers are the login flow and the unauthorized-response handler, and
//! both mean "start over".

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::auth::Role;
use crate::clock::{Clock, SystemClock};
use crate::storage::{MemoryStorage, SessionStorage, EXPIRY_KEY, TOKEN_KEY, USER_KEY};

/// Upper bound applied to `expiresIn` so the computed expiry stays
/// representable (one hundred years).
const MAX_EXPIRES_IN_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Minimal user data kept next to the token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

impl UserSummary {
    /// Name to greet the user with: first name, else email, else `Gast`.
    pub fn display_name(&self) -> &str {
        self.first_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.email.as_deref())
            .unwrap_or("Gast")
    }
}

/// A stored token and its expiry.
#[derive(Clone)]
pub struct Session {
    pub token: Zeroizing<String>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Liveness at a given instant.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        !self.token.is_empty() && now < self.expires_at
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Injectable session store shared by the fetch client and the auth flow.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// A store backed by process memory and the system clock.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), Arc::new(SystemClock))
    }

    /// Record a freshly issued token.
    ///
    /// `expires_at = now + expires_in_secs`. A missing `user` removes any
    /// summary left over from a previous login.
    pub fn persist(&self, token: &str, expires_in_secs: u64, user: Option<&UserSummary>) {
        let secs = expires_in_secs.min(MAX_EXPIRES_IN_SECS) as i64;
        let expires_at = self.clock.now() + Duration::seconds(secs);
        let expiry_ms = expires_at.timestamp_millis().to_string();

        // The old expiry must not outlive a failed token write.
        self.best_effort("drop expiry", self.storage.remove(EXPIRY_KEY));
        if !self.best_effort("persist token", self.storage.set(TOKEN_KEY, token))
            || !self.best_effort("persist expiry", self.storage.set(EXPIRY_KEY, &expiry_ms))
        {
            self.clear();
            return;
        }
        match user {
            Some(user) => match serde_json::to_string(user) {
                Ok(json) => {
                    self.best_effort("persist user", self.storage.set(USER_KEY, &json));
                }
                Err(e) => tracing::warn!("failed to encode user summary: {e}"),
            },
            None => {
                self.best_effort("remove user", self.storage.remove(USER_KEY));
            }
        }
        tracing::debug!(%expires_at, "session persisted");
    }

    /// The stored session, live or not.
    pub fn session(&self) -> Option<Session> {
        let token = self.read(TOKEN_KEY)?;
        let expiry = self.read(EXPIRY_KEY)?;
        let expires_at = match expiry
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
        {
            Some(at) => at,
            None => {
                tracing::warn!(value = %expiry, "ignoring unparseable token expiry");
                return None;
            }
        };
        Some(Session {
            token: Zeroizing::new(token),
            expires_at,
        })
    }

    /// True iff a token is stored and `now < expires_at`.
    pub fn is_live(&self) -> bool {
        self.session()
            .map(|s| s.is_live_at(self.clock.now()))
            .unwrap_or(false)
    }

    /// The bearer token, only while the session is live.
    pub fn token(&self) -> Option<Zeroizing<String>> {
        self.session()
            .filter(|s| s.is_live_at(self.clock.now()))
            .map(|s| s.token)
    }

    /// The stored user summary. Undecodable data counts as absent.
    pub fn user(&self) -> Option<UserSummary> {
        let raw = self.read(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("ignoring undecodable user summary: {e}");
                None
            }
        }
    }

    /// Merge profile edits into the stored summary, keeping old values
    /// where the update has none.
    pub fn update_user(&self, first_name: Option<&str>, last_name: Option<&str>) {
        let mut user = self.user().unwrap_or_default();
        if let Some(first) = first_name.filter(|s| !s.is_empty()) {
            user.first_name = Some(first.to_string());
        }
        if let Some(last) = last_name.filter(|s| !s.is_empty()) {
            user.last_name = Some(last.to_string());
        }
        match serde_json::to_string(&user) {
            Ok(json) => {
                self.best_effort("update user", self.storage.set(USER_KEY, &json));
            }
            Err(e) => tracing::warn!("failed to encode user summary: {e}"),
        }
    }

    /// Remove token, expiry, and user summary.
    pub fn clear(&self) {
        for key in [TOKEN_KEY, EXPIRY_KEY, USER_KEY] {
            self.best_effort("clear", self.storage.remove(key));
        }
        tracing::debug!("session cleared");
    }

    /// The clock this store measures expiry against.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(key, "session storage read failed: {e}");
                None
            }
        }
    }

    /// Log a failed write. Returns whether the write succeeded.
    fn best_effort(&self, op: &str, result: Result<(), crate::storage::StorageError>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(op, "session storage write failed: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::StorageError;

    fn start() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn store_with_clock() -> (SessionStore, Arc<ManualClock>, Arc<MemoryStorage>) {
        let clock = Arc::new(ManualClock::new(start()));
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(storage.clone(), clock.clone());
        (store, clock, storage)
    }

    struct BrokenStorage;

    impl SessionStorage for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disabled".into()))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".into()))
        }
        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disabled".into()))
        }
    }

    #[test]
    fn persisted_session_is_live_until_expiry() {
        let (store, clock, _) = store_with_clock();
        store.persist("t1", 3600, None);
        assert!(store.is_live());
        assert_eq!(store.token().as_deref().map(String::as_str), Some("t1"));

        clock.advance(Duration::seconds(3599));
        assert!(store.is_live());

        clock.advance(Duration::seconds(1));
        assert!(!store.is_live(), "now == expires_at is no longer live");
        assert!(store.token().is_none());
        assert!(store.session().is_some(), "expired session stays stored");
    }

    #[test]
    fn expiry_is_stored_as_epoch_millis() {
        let (store, _, storage) = store_with_clock();
        store.persist("t1", 60, None);
        let raw = storage.get(EXPIRY_KEY).unwrap().unwrap();
        assert_eq!(raw, (start().timestamp_millis() + 60_000).to_string());
    }

    #[test]
    fn clear_removes_everything() {
        let (store, _, storage) = store_with_clock();
        let user = UserSummary {
            id: Some(1),
            email: Some("a@b.com".into()),
            first_name: Some("Anna".into()),
            last_name: None,
            role: Some(Role::User),
        };
        store.persist("t1", 3600, Some(&user));
        assert_eq!(store.user(), Some(user));

        store.clear();
        assert!(!store.is_live());
        assert!(store.user().is_none());
        for key in [TOKEN_KEY, EXPIRY_KEY, USER_KEY] {
            assert_eq!(storage.get(key).unwrap(), None);
        }
    }

    #[test]
    fn empty_token_is_never_live() {
        let (store, _, _) = store_with_clock();
        store.persist("", 3600, None);
        assert!(!store.is_live());
    }

    #[test]
    fn garbage_expiry_is_not_live() {
        let (store, _, storage) = store_with_clock();
        storage.set(TOKEN_KEY, "t1").unwrap();
        storage.set(EXPIRY_KEY, "tomorrow").unwrap();
        assert!(!store.is_live());
    }

    #[test]
    fn undecodable_user_summary_is_absent() {
        let (store, _, storage) = store_with_clock();
        storage.set(USER_KEY, "{not json").unwrap();
        assert!(store.user().is_none());
    }

    #[test]
    fn update_user_merges_names() {
        let (store, _, _) = store_with_clock();
        let user = UserSummary {
            email: Some("a@b.com".into()),
            first_name: Some("Anna".into()),
            ..UserSummary::default()
        };
        store.persist("t1", 3600, Some(&user));
        store.update_user(None, Some("Berg"));
        let updated = store.user().unwrap();
        assert_eq!(updated.first_name.as_deref(), Some("Anna"));
        assert_eq!(updated.last_name.as_deref(), Some("Berg"));
    }

    #[test]
    fn broken_storage_behaves_as_unauthenticated() {
        let store = SessionStore::new(Arc::new(BrokenStorage), Arc::new(SystemClock));
        store.persist("t1", 3600, None);
        assert!(!store.is_live());
        assert!(store.user().is_none());
        store.clear();
    }

    /// Memory storage whose writes of one key can be switched off.
    struct FlakyStorage {
        inner: MemoryStorage,
        failing_key: parking_lot::Mutex<Option<&'static str>>,
    }

    impl SessionStorage for FlakyStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }
        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.failing_key.lock().is_some_and(|k| k == key) {
                return Err(StorageError::Unavailable("quota exceeded".into()));
            }
            self.inner.set(key, value)
        }
        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }
    }

    fn flaky_store() -> (SessionStore, Arc<ManualClock>, Arc<FlakyStorage>) {
        let clock = Arc::new(ManualClock::new(start()));
        let storage = Arc::new(FlakyStorage {
            inner: MemoryStorage::new(),
            failing_key: parking_lot::Mutex::new(None),
        });
        let store = SessionStore::new(storage.clone(), clock.clone());
        (store, clock, storage)
    }

    #[test]
    fn failed_token_write_does_not_revive_expired_token() {
        let (store, clock, storage) = flaky_store();
        store.persist("old", 60, None);
        clock.advance(Duration::seconds(120));
        assert!(!store.is_live());

        *storage.failing_key.lock() = Some(TOKEN_KEY);
        store.persist("new", 3600, None);
        assert!(!store.is_live());
        assert!(store.token().is_none());
        assert!(store.session().is_none());
    }

    #[test]
    fn failed_expiry_write_leaves_no_session() {
        let (store, _, storage) = flaky_store();
        store.persist("old", 3600, None);
        assert!(store.is_live());

        *storage.failing_key.lock() = Some(EXPIRY_KEY);
        store.persist("new", 3600, None);
        assert!(!store.is_live());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn huge_expires_in_does_not_overflow() {
        let (store, _, _) = store_with_clock();
        store.persist("t1", u64::MAX, None);
        assert!(store.is_live());
    }

    #[test]
    fn display_name_falls_back() {
        let mut user = UserSummary::default();
        assert_eq!(user.display_name(), "Gast");
        user.email = Some("a@b.com".into());
        assert_eq!(user.display_name(), "a@b.com");
        user.first_name = Some("Anna".into());
        assert_eq!(user.display_name(), "Anna");
    }

    #[test]
    fn debug_redacts_token() {
        let session = Session {
            token: Zeroizing::new("secret-token".into()),
            expires_at: start(),
        };
        let dbg = format!("{session:?}");
        assert!(!dbg.contains("secret-token"));
        assert!(dbg.contains("[REDACTED]"));
    }
}
