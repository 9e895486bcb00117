//! # Key-value storage seam
//!
//! Browser pages keep authentication state in `localStorage`/`sessionStorage`:
//! flat string keys mapping to string values, read and written synchronously.
//! [`KeyValueStore`] captures exactly that contract so the [`SessionStore`]
//! logic runs unchanged against the browser ([`crate::BrowserStorage`]), the
//! filesystem ([`crate::FileStore`]) or memory ([`crate::MemoryStore`]).
//!
//! Reads never fail: a backend that cannot be read behaves like an empty one.
//! Writes and removals report failures so callers can log them.
//!
//! [`SessionStore`]: crate::SessionStore

use crate::error::StoreError;

/// Synchronous string key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::rc::Rc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}
