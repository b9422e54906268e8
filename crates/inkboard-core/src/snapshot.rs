//! Persisted form of the stroke history.

use crate::stroke::Stroke;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current serialized format version.
pub const SNAPSHOT_SCHEMA: u32 = 1;

fn default_schema() -> u32 {
    SNAPSHOT_SCHEMA
}

/// Reasons a stored blob is not a usable snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Cursor {cursor} is past the end of {len} entries")]
    CursorOutOfRange { cursor: usize, len: usize },
    #[error("Unsupported snapshot schema {0}")]
    UnsupportedSchema(u32),
}

/// The full history at one point in time, tagged with its version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format version. Missing in older documents.
    #[serde(default = "default_schema")]
    pub schema: u32,
    pub entries: Vec<Stroke>,
    pub cursor: usize,
    pub version: u64,
}

impl Snapshot {
    pub fn new(entries: Vec<Stroke>, cursor: usize, version: u64) -> Self {
        Self {
            schema: SNAPSHOT_SCHEMA,
            entries,
            cursor,
            version,
        }
    }

    /// Strokes below the cursor.
    pub fn active_strokes(&self) -> &[Stroke] {
        &self.entries[..self.cursor.min(self.entries.len())]
    }

    /// Check the cursor and schema invariants.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.schema > SNAPSHOT_SCHEMA {
            return Err(SnapshotError::UnsupportedSchema(self.schema));
        }
        if self.cursor > self.entries.len() {
            return Err(SnapshotError::CursorOutOfRange {
                cursor: self.cursor,
                len: self.entries.len(),
            });
        }
        Ok(())
    }

    /// Serialize to JSON bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse and validate JSON bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_slice(bytes)?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}
