//! Browser `localStorage` store for WebAssembly.

use super::{BlobStore, BoxFuture, StorageError, StorageResult};
use web_sys::Storage;

/// `localStorage`-backed store, shared by every tab of the same origin.
///
/// Blobs are stored as UTF-8 text.
pub struct LocalStorageStore {
    storage: Storage,
}

impl LocalStorageStore {
    /// Open the window's `localStorage`.
    pub fn new() -> StorageResult<Self> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("No window object".to_string()))?;

        let storage = window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(format!("localStorage error: {:?}", e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage not available".to_string()))?;

        Ok(Self { storage })
    }
}

impl BlobStore for LocalStorageStore {
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<Vec<u8>>>> {
        let key = key.to_string();
        Box::pin(async move {
            let value = self
                .storage
                .get_item(&key)
                .map_err(|e| StorageError::Unavailable(format!("Failed to read {}: {:?}", key, e)))?;
            Ok(value.map(String::into_bytes))
        })
    }

    fn set(&self, key: &str, bytes: Vec<u8>) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            let text = String::from_utf8(bytes)
                .map_err(|e| StorageError::Other(format!("Blob is not UTF-8: {}", e)))?;
            self.storage
                .set_item(&key, &text)
                .map_err(|e| StorageError::Unavailable(format!("Failed to write {}: {:?}", key, e)))
        })
    }
}
