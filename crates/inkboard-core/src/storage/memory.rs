//! In-memory store.

use super::{BlobStore, BoxFuture, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory store for tests and participants sharing one process.
///
/// Can be switched offline to simulate an unreachable store.
#[derive(Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
    offline: AtomicBool,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `StorageError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> StorageResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }
}

impl BlobStore for MemoryStore {
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<Vec<u8>>>> {
        let key = key.to_string();
        Box::pin(async move {
            self.check_online()?;
            let blobs = self.blobs.read().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            Ok(blobs.get(&key).cloned())
        })
    }

    fn set(&self, key: &str, bytes: Vec<u8>) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            self.check_online()?;
            let mut blobs = self.blobs.write().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            blobs.insert(key, bytes);
            Ok(())
        })
    }
}
