use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{KeyValueStore, StorageError, StorageResult};

/// JSON-file backed store.
///
/// The whole map is loaded on open and rewritten on every mutation via a temp file and
/// rename, so a crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    map: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let map = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(|b| b.is_ascii_whitespace()) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), keys = map.len(), "opened file store");
        Ok(Self { path, map: Mutex::new(map) })
    }

    /// Like `open`, but a corrupt file is logged and treated as empty; the next write
    /// replaces it. I/O errors are still returned.
    pub fn open_or_reset(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        match Self::open(path.clone()) {
            Err(StorageError::Format(e)) => {
                warn!(path = %path.display(), "discarding unreadable storage file: {}", e);
                Ok(Self { path, map: Mutex::new(BTreeMap::new()) })
            }
            other => other,
        }
    }

    fn persist(&self, map: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let bytes = serde_json::to_vec_pretty(map)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.map.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut map = self.map.lock();
        let previous = map.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist(&map) {
            // keep memory in step with disk
            match previous {
                Some(v) => { map.insert(key.to_string(), v); }
                None => { map.remove(key); }
            }
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut map = self.map.lock();
        let Some(previous) = map.remove(key) else { return Ok(()); };
        if let Err(e) = self.persist(&map) {
            map.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }
}
