//! Periodic adoption of the stored snapshot.
//!
//! Collaboration is last-writer-wins: whichever participant saved most
//! recently is adopted by everyone else on their next tick. Two participants
//! editing within the same interval lose one side's work; nothing is merged.

use crate::history::History;
use crate::persistence::{InFlight, PersistenceAdapter};
use crate::snapshot::Snapshot;
use crate::storage::{BlobStore, BoxFuture};
use std::fmt;
use std::time::Duration;

/// A load started by a tick, resolved by `Whiteboard::finish_reconcile`.
pub type PendingLoad = BoxFuture<'static, Option<Snapshot>>;

/// Why a tick did not adopt anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A stroke is being drawn.
    DrawingInProgress,
    /// Local changes have not reached the store yet.
    UnpublishedChanges,
    /// The previous tick's load has not finished.
    LoadInFlight,
    /// The store holds no usable snapshot.
    NothingStored,
    /// The stored version matches the local one.
    UpToDate,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::DrawingInProgress => "drawing in progress",
            SkipReason::UnpublishedChanges => "local changes not yet saved",
            SkipReason::LoadInFlight => "previous load still outstanding",
            SkipReason::NothingStored => "nothing stored",
            SkipReason::UpToDate => "up to date",
        };
        f.write_str(reason)
    }
}

/// Result of one reconciliation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Adopted { version: u64 },
    Skipped(SkipReason),
}

impl ReconcileOutcome {
    pub fn is_adopted(&self) -> bool {
        matches!(self, ReconcileOutcome::Adopted { .. })
    }
}

/// Polling policy and the single outstanding-load slot.
#[derive(Debug)]
pub struct Reconciler {
    interval: Duration,
    load: InFlight,
}

impl Reconciler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            load: InFlight::default(),
        }
    }

    /// Time between ticks.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a load is outstanding.
    pub fn is_loading(&self) -> bool {
        self.load.is_set()
    }

    /// Start a load unless one is already outstanding.
    pub fn begin_load<S: BlobStore + 'static>(
        &self,
        persistence: &PersistenceAdapter<S>,
    ) -> Option<PendingLoad> {
        let guard = self.load.try_acquire()?;
        let load = persistence.load_task();
        Some(Box::pin(async move {
            let remote = load.await;
            drop(guard);
            remote
        }))
    }

    /// Decide whether `remote` should replace `local`.
    pub fn compare(local: &History, remote: Option<Snapshot>) -> Result<Snapshot, SkipReason> {
        let remote = remote.ok_or(SkipReason::NothingStored)?;
        if remote.version == local.version() {
            return Err(SkipReason::UpToDate);
        }
        Ok(remote)
    }
}
