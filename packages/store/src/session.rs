//! # SessionStore — the single owner of authentication state
//!
//! [`SessionStore`] answers "am I logged in, as whom, with what credential,
//! acting in which role". It keeps an in-memory [`Session`] and mirrors it into
//! a [`KeyValueStore`] (the browser's `localStorage` on the web) under the key
//! names configured in [`StorageConfig`].
//!
//! `SessionStore` is a cheap `Clone` handle: every clone shares the same
//! in-memory session, so the gateway, the role guard and the UI all observe the
//! same state. Only this module writes session keys.
//!
//! ## Invariant
//!
//! `token` and `user` are both present or both absent, in memory and in what
//! [`restore_session`](SessionStore::restore_session) accepts from storage.
//!
//! ## Storage schema
//!
//! | Key (default) | Value |
//! |---------------|-------|
//! | `token` | Bearer credential |
//! | `currentUser` | JSON-serialised [`UserRecord`] |
//! | `userRole` | Active role as a plain string |
//! | `access_token` | Legacy mirror of `token`, written when `mirror_legacy_token` is on |
//! | `astegni_storage_version` | Schema version stamped by [`migrate_legacy_keys`](SessionStore::migrate_legacy_keys) |
//!
//! Reads only ever consult the canonical keys. Values that older scripts left
//! under legacy names are moved over once, at startup, by the migration.
//!
//! ## Failure semantics
//!
//! Unreadable or corrupted storage is "no session": restoring returns `false`
//! and the caller proceeds as a guest. Write failures are returned to the
//! caller (persist) or logged (clear, migration).

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::StorageConfig;
use crate::error::StoreError;
use crate::kv::KeyValueStore;
use crate::models::{RoleName, UserRecord};

/// Current version of the storage schema.
pub const STORAGE_SCHEMA_VERSION: u32 = 2;

/// In-memory authentication state of the current tab.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<UserRecord>,
    pub active_role: Option<RoleName>,
}

/// Persists and restores the session over a [`KeyValueStore`].
#[derive(Clone)]
pub struct SessionStore<S> {
    backend: S,
    keys: Arc<StorageConfig>,
    state: Arc<Mutex<Session>>,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Create an empty session over `backend`. Nothing is read yet.
    pub fn new(backend: S, keys: StorageConfig) -> Self {
        Self {
            backend,
            keys: Arc::new(keys),
            state: Arc::new(Mutex::new(Session::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, Session> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn keys(&self) -> &StorageConfig {
        &self.keys
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Hydrate the in-memory session from storage.
    ///
    /// Returns whether a candidate session (token and a readable user) was
    /// found. The token is not verified here.
    pub fn restore_session(&self) -> bool {
        let token = self.backend.get(&self.keys.token_key);
        let user_json = self.backend.get(&self.keys.user_key);

        let (Some(token), Some(user_json)) = (token, user_json) else {
            tracing::debug!("no persisted session");
            *self.state() = Session::default();
            return false;
        };

        let user = match serde_json::from_str::<UserRecord>(&user_json) {
            Ok(user) => user.normalize(),
            Err(e) => {
                tracing::warn!("persisted user is unreadable, treating as guest: {e}");
                *self.state() = Session::default();
                return false;
            }
        };

        let active_role = self
            .backend
            .get(&self.keys.active_role_key)
            .and_then(|raw| raw.parse::<RoleName>().ok())
            .or_else(|| user.default_role());

        tracing::debug!(user_id = user.id, ?active_role, "restored persisted session");
        *self.state() = Session {
            token: Some(token),
            user: Some(user),
            active_role,
        };
        true
    }

    /// Write token and user to storage and adopt them in memory.
    ///
    /// The user is normalized first. When `mirror_legacy_token` is set the
    /// token is also written under every legacy key.
    pub fn persist(&self, token: &str, user: UserRecord) -> Result<(), StoreError> {
        let user = user.normalize();
        let user_json = serde_json::to_string(&user)?;

        self.backend.set(&self.keys.token_key, token)?;
        if let Err(e) = self.backend.set(&self.keys.user_key, &user_json) {
            self.remove_or_warn(&self.keys.token_key);
            return Err(e);
        }

        if self.keys.mirror_legacy_token {
            for key in &self.keys.legacy_token_keys {
                if let Err(e) = self.backend.set(key, token) {
                    tracing::warn!(key = key.as_str(), "failed to mirror token: {e}");
                }
            }
        }

        let mut state = self.state();
        state.token = Some(token.to_string());
        state.user = Some(user);
        Ok(())
    }

    /// Remove every session key, canonical and legacy, and forget the session.
    pub fn clear(&self) {
        for key in self.keys.all_session_keys() {
            if let Err(e) = self.backend.remove(key) {
                tracing::warn!(key, "failed to remove session key: {e}");
            }
        }
        *self.state() = Session::default();
        tracing::debug!("session cleared");
    }

    pub fn token(&self) -> Option<String> {
        self.state().token.clone()
    }

    pub fn user(&self) -> Option<UserRecord> {
        self.state().user.clone()
    }

    pub fn active_role(&self) -> Option<RoleName> {
        self.state().active_role
    }

    /// Snapshot of the whole session.
    pub fn session(&self) -> Session {
        self.state().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().token.is_some()
    }

    /// Persist the active role (or forget it with `None`).
    pub fn set_active_role(&self, role: Option<RoleName>) -> Result<(), StoreError> {
        match role {
            Some(role) => self.backend.set(&self.keys.active_role_key, role.as_str())?,
            None => self.backend.remove(&self.keys.active_role_key)?,
        }
        self.state().active_role = role;
        Ok(())
    }

    /// Replace the held roles of the current user. No-op without a user.
    pub fn update_roles(&self, roles: BTreeSet<RoleName>) -> Result<(), StoreError> {
        let Some(mut user) = self.user() else {
            return Ok(());
        };
        if user.roles == roles {
            return Ok(());
        }
        user.roles = roles;
        let user_json = serde_json::to_string(&user)?;
        self.backend.set(&self.keys.user_key, &user_json)?;
        self.state().user = Some(user);
        Ok(())
    }

    /// Move values that older scripts stored under legacy key names onto the
    /// canonical keys, once per schema version.
    ///
    /// Returns `true` if the migration ran.
    pub fn migrate_legacy_keys(&self) -> bool {
        let version = self
            .backend
            .get(&self.keys.schema_version_key)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(0);
        if version >= STORAGE_SCHEMA_VERSION {
            return false;
        }

        if self.backend.get(&self.keys.token_key).is_none() {
            let legacy = self
                .keys
                .legacy_token_keys
                .iter()
                .find_map(|key| self.backend.get(key));
            if let Some(token) = legacy {
                self.set_or_warn(&self.keys.token_key, &token);
            }
        }

        if self.backend.get(&self.keys.user_key).is_none() {
            let legacy = self
                .keys
                .legacy_user_keys
                .iter()
                .find_map(|key| self.backend.get(key));
            if let Some(user) = legacy {
                self.set_or_warn(&self.keys.user_key, &user);
            }
        }

        for key in &self.keys.legacy_user_keys {
            self.remove_or_warn(key);
        }

        let canonical_token = self.backend.get(&self.keys.token_key);
        for key in &self.keys.legacy_token_keys {
            match (&canonical_token, self.keys.mirror_legacy_token) {
                (Some(token), true) => self.set_or_warn(key, token),
                _ => self.remove_or_warn(key),
            }
        }

        self.set_or_warn(
            &self.keys.schema_version_key,
            &STORAGE_SCHEMA_VERSION.to_string(),
        );
        tracing::info!(from = version, to = STORAGE_SCHEMA_VERSION, "migrated session storage");
        true
    }

    /// React to a storage write made by another tab.
    ///
    /// `key` is the changed key, or `None` when the other tab cleared the
    /// whole storage area. Returns `true` if the in-memory session changed.
    pub fn reconcile_external_change(&self, key: Option<&str>) -> bool {
        let before = self.session();
        match key {
            None => {
                self.restore_session();
            }
            Some(k) if k == self.keys.token_key || k == self.keys.user_key => {
                self.restore_session();
            }
            Some(k) if k == self.keys.active_role_key => {
                let role = self
                    .backend
                    .get(&self.keys.active_role_key)
                    .and_then(|raw| raw.parse::<RoleName>().ok());
                let mut state = self.state();
                if state.token.is_some() {
                    state.active_role = role;
                }
            }
            Some(_) => return false,
        }
        let changed = self.session() != before;
        if changed {
            tracing::info!(key, "session changed in another tab");
        }
        changed
    }

    fn set_or_warn(&self, key: &str, value: &str) {
        if let Err(e) = self.backend.set(key, value) {
            tracing::warn!(key, "failed to write storage key: {e}");
        }
    }

    fn remove_or_warn(&self, key: &str) {
        if let Err(e) = self.backend.remove(key) {
            tracing::warn!(key, "failed to remove storage key: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn tutor() -> UserRecord {
        UserRecord {
            id: 1,
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            email: Some("a@b.com".to_string()),
            role: Some(RoleName::Tutor),
            ..Default::default()
        }
    }

    fn store() -> (MemoryStore, SessionStore<MemoryStore>) {
        let backend = MemoryStore::new();
        let session = SessionStore::new(backend.clone(), StorageConfig::default());
        (backend, session)
    }

    fn assert_symmetric(session: &SessionStore<MemoryStore>) {
        assert_eq!(session.token().is_some(), session.user().is_some());
    }

    #[test]
    fn test_fresh_storage_has_no_session() {
        let (_, session) = store();
        assert!(!session.restore_session());
        assert!(session.user().is_none());
        assert!(session.token().is_none());
        assert!(!session.is_authenticated());
    }

    #[derive(Clone)]
    struct RefusingStore {
        inner: MemoryStore,
        refused: &'static str,
    }

    impl KeyValueStore for RefusingStore {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            if key == self.refused {
                return Err(StoreError::Unavailable("quota exceeded".to_string()));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_failed_user_write_rolls_back_token() {
        let backend = RefusingStore {
            inner: MemoryStore::new(),
            refused: "currentUser",
        };
        let session = SessionStore::new(backend.clone(), StorageConfig::default());

        assert!(session.persist("T", tutor()).is_err());

        assert!(backend.get("token").is_none());
        assert!(backend.get("access_token").is_none());
        assert!(!session.is_authenticated());
        assert!(!session.restore_session());
    }

    #[test]
    fn test_persist_writes_canonical_and_legacy_keys() {
        let (backend, session) = store();
        session.persist("T", tutor()).unwrap();

        assert_eq!(session.token().as_deref(), Some("T"));
        assert_eq!(
            session.user().unwrap().roles,
            BTreeSet::from([RoleName::Tutor])
        );
        assert_eq!(backend.get("token").as_deref(), Some("T"));
        assert_eq!(backend.get("access_token").as_deref(), Some("T"));
        assert!(backend.get("currentUser").unwrap().contains("\"tutor\""));
    }

    #[test]
    fn test_persist_without_mirroring() {
        let backend = MemoryStore::new();
        let keys = StorageConfig {
            mirror_legacy_token: false,
            ..Default::default()
        };
        let session = SessionStore::new(backend.clone(), keys);
        session.persist("T", tutor()).unwrap();

        assert!(backend.get("access_token").is_none());
    }

    #[test]
    fn test_restore_roundtrip_across_instances() {
        let (backend, session) = store();
        session.persist("T", tutor()).unwrap();
        session.set_active_role(Some(RoleName::Tutor)).unwrap();

        let reloaded = SessionStore::new(backend, StorageConfig::default());
        assert!(reloaded.restore_session());
        assert_eq!(reloaded.token().as_deref(), Some("T"));
        assert_eq!(reloaded.user().unwrap().id, 1);
        assert_eq!(reloaded.active_role(), Some(RoleName::Tutor));
    }

    #[test]
    fn test_restore_fills_roles_and_default_active_role() {
        let (backend, session) = store();
        backend.set("token", "T").unwrap();
        backend
            .set("currentUser", r#"{"id": 4, "role": "parent"}"#)
            .unwrap();

        assert!(session.restore_session());
        let user = session.user().unwrap();
        assert_eq!(user.roles, BTreeSet::from([RoleName::Parent]));
        assert_eq!(session.active_role(), Some(RoleName::Parent));
    }

    #[test]
    fn test_corrupted_user_is_no_session() {
        let (backend, session) = store();
        backend.set("token", "T").unwrap();
        backend.set("currentUser", "{not json").unwrap();

        assert!(!session.restore_session());
        assert!(session.token().is_none());
        assert_symmetric(&session);
    }

    #[test]
    fn test_token_without_user_is_no_session() {
        let (backend, session) = store();
        backend.set("token", "T").unwrap();

        assert!(!session.restore_session());
        assert_symmetric(&session);
    }

    #[test]
    fn test_clear_removes_every_key() {
        let (backend, session) = store();
        backend.set("user", "{}").unwrap();
        session.persist("T", tutor()).unwrap();
        session.set_active_role(Some(RoleName::Tutor)).unwrap();

        session.clear();

        assert!(backend.is_empty());
        assert_eq!(session.session(), Session::default());
    }

    #[test]
    fn test_session_symmetry_over_persist_and_clear() {
        let (_, session) = store();
        assert_symmetric(&session);
        for i in 0..4 {
            session.persist(&format!("T{i}"), tutor()).unwrap();
            assert_symmetric(&session);
            if i % 2 == 0 {
                session.clear();
                assert_symmetric(&session);
            }
        }
    }

    #[test]
    fn test_clones_share_state() {
        let (_, session) = store();
        let other = session.clone();
        session.persist("T", tutor()).unwrap();
        assert_eq!(other.token().as_deref(), Some("T"));
    }

    #[test]
    fn test_update_roles_rewrites_user_blob() {
        let (backend, session) = store();
        session.persist("T", tutor()).unwrap();

        session
            .update_roles(BTreeSet::from([RoleName::Tutor, RoleName::Student]))
            .unwrap();

        assert!(session.user().unwrap().has_role(RoleName::Student));
        assert!(backend.get("currentUser").unwrap().contains("\"student\""));
    }

    #[test]
    fn test_migrate_moves_legacy_values() {
        let (backend, session) = store();
        backend.set("access_token", "OLD").unwrap();
        backend.set("user", r#"{"id": 9, "role": "student"}"#).unwrap();

        assert!(session.migrate_legacy_keys());

        assert_eq!(backend.get("token").as_deref(), Some("OLD"));
        assert!(backend.get("currentUser").is_some());
        assert!(backend.get("user").is_none());
        // mirroring is on by default, so the legacy token stays in sync
        assert_eq!(backend.get("access_token").as_deref(), Some("OLD"));
        assert_eq!(backend.get("astegni_storage_version").as_deref(), Some("2"));

        assert!(session.restore_session());
        assert_eq!(session.user().unwrap().id, 9);

        // runs once per version
        assert!(!session.migrate_legacy_keys());
    }

    #[test]
    fn test_migrate_drops_legacy_token_without_mirroring() {
        let backend = MemoryStore::new();
        let keys = StorageConfig {
            mirror_legacy_token: false,
            ..Default::default()
        };
        let session = SessionStore::new(backend.clone(), keys);
        backend.set("token", "NEW").unwrap();
        backend.set("access_token", "STALE").unwrap();

        assert!(session.migrate_legacy_keys());
        assert_eq!(backend.get("token").as_deref(), Some("NEW"));
        assert!(backend.get("access_token").is_none());
    }

    #[test]
    fn test_reconcile_logout_in_other_tab() {
        let (backend, session) = store();
        session.persist("T", tutor()).unwrap();

        // Another tab logs out
        let other_tab = SessionStore::new(backend.clone(), StorageConfig::default());
        other_tab.clear();

        assert!(session.reconcile_external_change(Some("token")));
        assert!(!session.is_authenticated());
        assert_symmetric(&session);
    }

    #[test]
    fn test_reconcile_role_switch_in_other_tab() {
        let (backend, session) = store();
        session.persist("T", tutor()).unwrap();
        session.set_active_role(Some(RoleName::Tutor)).unwrap();

        backend.set("userRole", "student").unwrap();
        assert!(session.reconcile_external_change(Some("userRole")));
        assert_eq!(session.active_role(), Some(RoleName::Student));

        assert!(!session.reconcile_external_change(Some("theme")));
    }
}
