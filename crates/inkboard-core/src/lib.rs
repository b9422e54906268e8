//! Inkboard Core Library
//!
//! Platform-agnostic drawing history for the Inkboard whiteboard: stroke
//! capture, cursor-based undo/redo, snapshot persistence to a shared blob
//! store and last-writer-wins reconciliation between participants.

pub mod buffer;
pub mod config;
pub mod history;
pub mod input;
pub mod persistence;
pub mod reconcile;
pub mod render;
pub mod snapshot;
pub mod storage;
pub mod stroke;
pub mod whiteboard;

#[cfg(test)]
mod testing;

pub use buffer::{InvalidState, StrokeBuffer};
pub use config::{DEFAULT_DOCUMENT_KEY, DEFAULT_RECONCILE_INTERVAL_MS, WhiteboardConfig};
pub use history::History;
pub use input::PointerEvent;
pub use persistence::{PersistenceAdapter, PersistenceError};
pub use reconcile::{PendingLoad, ReconcileOutcome, Reconciler, SkipReason};
pub use render::{DrawCall, DrawingSink, RecordingSink, RenderDispatcher};
pub use snapshot::{SNAPSHOT_SCHEMA, Snapshot, SnapshotError};
pub use storage::{BlobStore, BoxFuture, MemoryStore, StorageError, StorageResult};
pub use stroke::{Stroke, StrokeStyle};
pub use whiteboard::Whiteboard;
