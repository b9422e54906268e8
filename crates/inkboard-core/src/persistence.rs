//! Saving and loading history snapshots through a blob store.
//!
//! Persistence is best effort: a failed save is logged and forgotten, and any
//! load problem (store down, missing key, corrupt blob) reads as "nothing
//! stored". The in-memory history is never touched here.

use crate::snapshot::{Snapshot, SnapshotError};
use crate::storage::{BlobStore, BoxFuture, StorageError};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Why a stored snapshot could not be loaded.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Malformed snapshot: {0}")]
    Malformed(#[from] SnapshotError),
}

/// Reads and writes the document snapshot under one fixed key.
pub struct PersistenceAdapter<S> {
    store: Arc<S>,
    key: String,
}

impl<S: BlobStore + 'static> PersistenceAdapter<S> {
    pub fn new(store: Arc<S>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Write the snapshot. Failures are logged, never returned.
    pub async fn save(&self, snapshot: &Snapshot) {
        save_to(self.store.as_ref(), &self.key, snapshot).await
    }

    /// Load the stored snapshot, or `None` if there is no usable one.
    pub async fn load(&self) -> Option<Snapshot> {
        load_from(self.store.as_ref(), &self.key).await
    }

    /// Load the stored snapshot, reporting why it is unusable.
    pub async fn try_load(&self) -> Result<Option<Snapshot>, PersistenceError> {
        try_load_from(self.store.as_ref(), &self.key).await
    }

    /// A save that owns its store handle, for runtimes that poll it
    /// alongside other work.
    pub fn save_task(&self, snapshot: Snapshot) -> BoxFuture<'static, ()> {
        let store = Arc::clone(&self.store);
        let key = self.key.clone();
        Box::pin(async move { save_to(store.as_ref(), &key, &snapshot).await })
    }

    /// A load that owns its store handle.
    pub fn load_task(&self) -> BoxFuture<'static, Option<Snapshot>> {
        let store = Arc::clone(&self.store);
        let key = self.key.clone();
        Box::pin(async move { load_from(store.as_ref(), &key).await })
    }
}

async fn save_to<S: BlobStore + ?Sized>(store: &S, key: &str, snapshot: &Snapshot) {
    let bytes = match snapshot.to_bytes() {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Failed to serialize snapshot v{}: {}", snapshot.version, e);
            return;
        }
    };

    match store.set(key, bytes).await {
        Ok(()) => log::debug!("Saved snapshot v{} to '{}'", snapshot.version, key),
        Err(e) => log::warn!("Failed to save snapshot v{} to '{}': {}", snapshot.version, key, e),
    }
}

async fn try_load_from<S: BlobStore + ?Sized>(
    store: &S,
    key: &str,
) -> Result<Option<Snapshot>, PersistenceError> {
    match store.get(key).await? {
        Some(bytes) => Ok(Some(Snapshot::from_bytes(&bytes)?)),
        None => Ok(None),
    }
}

async fn load_from<S: BlobStore + ?Sized>(store: &S, key: &str) -> Option<Snapshot> {
    match try_load_from(store, key).await {
        Ok(Some(snapshot)) => Some(snapshot),
        Ok(None) => {
            log::debug!("No snapshot stored under '{}'", key);
            None
        }
        Err(e) => {
            log::warn!("Ignoring snapshot under '{}': {}", key, e);
            None
        }
    }
}

/// Marks one outstanding store operation of a kind.
#[derive(Debug, Clone, Default)]
pub(crate) struct InFlight(Arc<AtomicBool>);

impl InFlight {
    /// Claim the slot, or `None` if an operation is already outstanding.
    pub(crate) fn try_acquire(&self) -> Option<InFlightGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(Arc::clone(&self.0)))
    }

    pub(crate) fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Releases the slot when the operation completes or its future is dropped.
pub(crate) struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
