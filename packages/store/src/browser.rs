//! # Web Storage backend — browser-side persistence
//!
//! [`BrowserStorage`] is the [`KeyValueStore`] implementation used on the **web
//! platform**. It wraps the browser's Web Storage API via [`web_sys`]:
//!
//! | Scope | Browser object | Lifetime |
//! |-------|----------------|----------|
//! | [`StorageScope::Local`] | `window.localStorage` | Durable, shared by every tab of the origin |
//! | [`StorageScope::Session`] | `window.sessionStorage` | Current tab only, cleared when it closes |
//!
//! ## Connection management
//!
//! `BrowserStorage` is a tiny `Copy` handle that looks up the `Storage` object
//! on every call. The lookup is cheap and keeps the handle free of JS values,
//! so it can live inside signals and contexts.
//!
//! ## Error handling
//!
//! Reads swallow errors (a disabled or inaccessible storage reads as empty).
//! Writes surface [`StoreError::Unavailable`], e.g. when the quota is exceeded
//! or storage is blocked by privacy settings.

use web_sys::Storage;

use crate::error::StoreError;
use crate::kv::KeyValueStore;

/// Which Web Storage area a [`BrowserStorage`] handle targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageScope {
    Local,
    Session,
}

/// Web Storage backed KeyValueStore for the web platform.
#[derive(Clone, Copy, Debug)]
pub struct BrowserStorage {
    scope: StorageScope,
}

impl BrowserStorage {
    /// Durable storage (`localStorage`).
    pub fn local() -> Self {
        Self {
            scope: StorageScope::Local,
        }
    }

    /// Tab-scoped storage (`sessionStorage`).
    pub fn session() -> Self {
        Self {
            scope: StorageScope::Session,
        }
    }

    pub fn scope(&self) -> StorageScope {
        self.scope
    }

    fn storage(&self) -> Result<Storage, StoreError> {
        let window = web_sys::window()
            .ok_or_else(|| StoreError::Unavailable("no window".to_string()))?;
        let storage = match self.scope {
            StorageScope::Local => window.local_storage(),
            StorageScope::Session => window.session_storage(),
        };
        storage
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))?
            .ok_or_else(|| StoreError::Unavailable("storage disabled".to_string()))
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage().ok()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.storage()?
            .remove_item(key)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
    }
}
