//! Durable blob store abstraction shared by every participant.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod local;

pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorageStore;

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Key-value blob store.
///
/// Writes replace the whole value under a key; there are no partial updates.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait BlobStore: Send + Sync {
    /// Read the value under `key`, `None` if absent.
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<Vec<u8>>>>;

    /// Replace the value under `key`.
    fn set(&self, key: &str, bytes: Vec<u8>) -> BoxFuture<'_, StorageResult<()>>;
}

/// Key-value blob store (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait BlobStore {
    /// Read the value under `key`, `None` if absent.
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<Vec<u8>>>>;

    /// Replace the value under `key`.
    fn set(&self, key: &str, bytes: Vec<u8>) -> BoxFuture<'_, StorageResult<()>>;
}

/// Convenience type alias for the platform-specific store.
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformStore = FileStore;

#[cfg(target_arch = "wasm32")]
pub type PlatformStore = LocalStorageStore;

/// Create a platform-appropriate store in its default location.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_store() -> StorageResult<PlatformStore> {
    FileStore::default_location()
}

#[cfg(target_arch = "wasm32")]
pub fn create_default_store() -> StorageResult<PlatformStore> {
    LocalStorageStore::new()
}
