//!
//! alumnae durable storage
//! -----------------------
//! A small string key/value abstraction standing in for the device's persistent storage.
//! The client only ever persists one value here: the bearer token, under a configurable key.
//!
//! - `KeyValueStore` is the injected seam; the HTTP client and the session controller both
//!   receive it instead of reaching for a global.
//! - `FileStore` keeps the map in a JSON file that survives process restarts.
//! - `MemoryStore` is the in-process fake used by tests and ephemeral sessions.
//! - `TokenStore` binds a store to the token key and exposes get/set/clear.

use std::io;

use thiserror::Error;

mod file;
mod memory;
mod token;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use token::TokenStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] io::Error),
    #[error("storage file is corrupt: {0}")]
    Format(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Persistent string key/value storage.
///
/// Implementations must tolerate concurrent callers; writes are visible to subsequent
/// reads from any clone sharing the same backing store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;
}
