use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{KeyValueStore, StorageResult};

/// The bearer token slot in durable storage.
///
/// Clones share one write lock, so a compare-and-clear cannot interleave with a `set`
/// made through another clone.
#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn KeyValueStore>,
    key: Arc<str>,
    writes: Arc<Mutex<()>>,
}

impl TokenStore {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<Arc<str>>) -> Self {
        Self { store, key: key.into(), writes: Arc::new(Mutex::new(())) }
    }

    pub fn key(&self) -> &str { &self.key }

    /// Blank values are treated as absent.
    pub fn get(&self) -> StorageResult<Option<String>> {
        Ok(self.store.get(&self.key)?.filter(|t| !t.trim().is_empty()))
    }

    pub fn set(&self, token: &str) -> StorageResult<()> {
        let _w = self.writes.lock();
        self.store.set(&self.key, token)
    }

    pub fn clear(&self) -> StorageResult<()> {
        let _w = self.writes.lock();
        self.store.remove(&self.key)
    }

    /// Remove the token only if it is still `expected`. Returns whether it was removed.
    pub fn clear_if(&self, expected: &str) -> StorageResult<bool> {
        let _w = self.writes.lock();
        if self.store.get(&self.key)?.as_deref() != Some(expected) {
            return Ok(false);
        }
        self.store.remove(&self.key)?;
        Ok(true)
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore").field("key", &self.key).finish_non_exhaustive()
    }
}
