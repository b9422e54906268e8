//! Cursor-based undo/redo history of committed strokes.

use crate::snapshot::Snapshot;
use crate::stroke::Stroke;

/// Ordered committed strokes plus a cursor separating the active strokes
/// (`entries[..cursor]`) from the redo branch.
///
/// `version` increases on every commit, undo and redo that changes state, and
/// is what reconciliation compares instead of the stroke contents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    entries: Vec<Stroke>,
    cursor: usize,
    version: u64,
}

impl History {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished stroke. Any redo branch is discarded first.
    pub fn commit(&mut self, stroke: Stroke) {
        self.entries.truncate(self.cursor);
        self.entries.push(stroke);
        self.cursor = self.entries.len();
        self.version += 1;
    }

    /// Hide the most recent active stroke. A no-op at the start of history.
    pub fn undo(&mut self) -> &[Stroke] {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.version += 1;
        }
        self.active_strokes()
    }

    /// Reveal the next stroke of the redo branch. A no-op at the end of history.
    pub fn redo(&mut self) -> &[Stroke] {
        if self.cursor < self.entries.len() {
            self.cursor += 1;
            self.version += 1;
        }
        self.active_strokes()
    }

    /// Strokes that should currently be rendered.
    pub fn active_strokes(&self) -> &[Stroke] {
        &self.entries[..self.cursor]
    }

    /// Replace the whole state with a snapshot's.
    ///
    /// The snapshot is expected to be valid; an out-of-range cursor is clamped.
    pub fn adopt(&mut self, snapshot: Snapshot) {
        let Snapshot {
            entries,
            cursor,
            version,
            ..
        } = snapshot;
        debug_assert!(cursor <= entries.len());
        self.cursor = cursor.min(entries.len());
        self.entries = entries;
        self.version = version;
    }

    /// Copy the current state out as a snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.entries.clone(), self.cursor, self.version)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// All entries, including the redo branch.
    pub fn entries(&self) -> &[Stroke] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
