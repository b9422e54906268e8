//! A whiteboard session: stroke capture, history, persistence and
//! reconciliation behind one owner.
//!
//! All mutation goes through `&mut self`, so pointer input and reconciliation
//! ticks are naturally serialized by whoever drives the session. Store I/O is
//! handed out as detached futures so the driver can keep handling input while
//! a save or load is outstanding.

use crate::buffer::{InvalidState, StrokeBuffer};
use crate::config::WhiteboardConfig;
use crate::history::History;
use crate::input::PointerEvent;
use crate::persistence::{InFlight, PersistenceAdapter};
use crate::reconcile::{PendingLoad, ReconcileOutcome, Reconciler, SkipReason};
use crate::render::{DrawingSink, RenderDispatcher};
use crate::snapshot::Snapshot;
use crate::storage::{BlobStore, BoxFuture};
use crate::stroke::{Stroke, StrokeStyle};
use kurbo::Point;
use std::sync::Arc;
use uuid::Uuid;

/// One participant's view of the shared document.
pub struct Whiteboard<S, D> {
    id: Uuid,
    pen: StrokeStyle,
    buffer: StrokeBuffer,
    history: History,
    dispatcher: RenderDispatcher,
    sink: D,
    persistence: PersistenceAdapter<S>,
    reconciler: Reconciler,
    /// Latest snapshot not yet handed to the store.
    outbox: Option<Snapshot>,
    saving: InFlight,
}

impl<S: BlobStore + 'static, D: DrawingSink> Whiteboard<S, D> {
    /// Start a session with an empty history.
    pub fn new(store: Arc<S>, sink: D, config: WhiteboardConfig) -> Self {
        let WhiteboardConfig {
            document_key,
            reconcile_interval,
            pen,
        } = config;

        let id = Uuid::new_v4();
        log::info!("Whiteboard session {} on '{}'", id, document_key);

        Self {
            id,
            pen,
            buffer: StrokeBuffer::new(),
            history: History::new(),
            dispatcher: RenderDispatcher::new(),
            sink,
            persistence: PersistenceAdapter::new(store, document_key),
            reconciler: Reconciler::new(reconcile_interval),
            outbox: None,
            saving: InFlight::default(),
        }
    }

    /// Start a session, picking up whatever the store already holds.
    pub async fn open(store: Arc<S>, sink: D, config: WhiteboardConfig) -> Self {
        let mut whiteboard = Self::new(store, sink, config);
        if let Some(snapshot) = whiteboard.persistence.load().await {
            log::info!(
                "Session {} restored {} strokes at v{}",
                whiteboard.id,
                snapshot.entries.len(),
                snapshot.version
            );
            whiteboard.adopt(snapshot);
        }
        whiteboard
    }

    // --- Pointer input ---

    /// Start a stroke at `position` with the current pen.
    pub fn pointer_down(&mut self, position: Point) -> Result<(), InvalidState> {
        self.buffer.begin(self.pen.clone())?;
        self.buffer.append(position);
        Ok(())
    }

    /// Extend the current stroke. Ignored when no stroke is in progress.
    pub fn pointer_move(&mut self, position: Point) {
        self.buffer.append(position);
        if let Some(stroke) = self.buffer.current() {
            self.dispatcher.preview(stroke, &mut self.sink);
        }
    }

    /// Finish the current stroke and commit it.
    pub fn pointer_up(&mut self) -> Result<(), InvalidState> {
        let stroke = self.buffer.end()?;
        log::debug!(
            "Session {} committed stroke with {} points",
            self.id,
            stroke.len()
        );
        self.history.commit(stroke);
        self.local_change();
        Ok(())
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<(), InvalidState> {
        match event {
            PointerEvent::Down { position } => self.pointer_down(position),
            PointerEvent::Move { position } => {
                self.pointer_move(position);
                Ok(())
            }
            PointerEvent::Up => self.pointer_up(),
        }
    }

    // --- History ---

    /// Undo the last stroke. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let before = self.history.version();
        self.history.undo();
        self.changed_since(before)
    }

    /// Redo the last undone stroke. Returns false if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        let before = self.history.version();
        self.history.redo();
        self.changed_since(before)
    }

    fn changed_since(&mut self, version: u64) -> bool {
        if self.history.version() == version {
            return false;
        }
        self.local_change();
        true
    }

    fn local_change(&mut self) {
        self.redraw();
        self.outbox = Some(self.history.snapshot());
    }

    fn adopt(&mut self, snapshot: Snapshot) {
        self.history.adopt(snapshot);
        self.redraw();
    }

    fn redraw(&mut self) {
        self.dispatcher
            .redraw_from(self.history.active_strokes(), &mut self.sink);
    }

    // --- Persistence ---

    /// Hand out the staged save, if any.
    ///
    /// Only one save is outstanding at a time so snapshots reach the store in
    /// order; while one is, this returns `None` and the newest snapshot stays
    /// staged. The returned future never fails.
    pub fn take_save(&mut self) -> Option<BoxFuture<'static, ()>> {
        if self.outbox.is_none() {
            return None;
        }
        let guard = self.saving.try_acquire()?;
        let snapshot = self.outbox.take()?;
        let save = self.persistence.save_task(snapshot);
        Some(Box::pin(async move {
            save.await;
            drop(guard);
        }))
    }

    /// Save everything staged so far.
    ///
    /// Does not wait for a save previously returned by `take_save`.
    pub async fn flush(&mut self) {
        while let Some(save) = self.take_save() {
            save.await;
        }
    }

    /// Whether local changes are staged or still being written.
    pub fn has_unpublished_changes(&self) -> bool {
        self.outbox.is_some() || self.saving.is_set()
    }

    // --- Reconciliation ---

    /// Run one full reconciliation tick.
    pub async fn reconcile(&mut self) -> ReconcileOutcome {
        match self.begin_reconcile() {
            Ok(load) => {
                let remote = load.await;
                self.finish_reconcile(remote)
            }
            Err(reason) => self.skipped(reason),
        }
    }

    /// First half of a tick: start loading the stored snapshot.
    pub fn begin_reconcile(&mut self) -> Result<PendingLoad, SkipReason> {
        self.ready_to_adopt()?;
        self.reconciler
            .begin_load(&self.persistence)
            .ok_or(SkipReason::LoadInFlight)
    }

    /// Second half of a tick: adopt the loaded snapshot if it differs.
    ///
    /// Local activity is checked again since input may have arrived while
    /// the load was outstanding.
    pub fn finish_reconcile(&mut self, remote: Option<Snapshot>) -> ReconcileOutcome {
        let remote = match self
            .ready_to_adopt()
            .and_then(|()| Reconciler::compare(&self.history, remote))
        {
            Ok(remote) => remote,
            Err(reason) => return self.skipped(reason),
        };

        let version = remote.version;
        log::info!(
            "Session {} adopting remote v{} (local v{})",
            self.id,
            version,
            self.history.version()
        );
        self.adopt(remote);
        ReconcileOutcome::Adopted { version }
    }

    fn ready_to_adopt(&self) -> Result<(), SkipReason> {
        if self.buffer.is_drawing() {
            return Err(SkipReason::DrawingInProgress);
        }
        if self.has_unpublished_changes() {
            return Err(SkipReason::UnpublishedChanges);
        }
        Ok(())
    }

    fn skipped(&self, reason: SkipReason) -> ReconcileOutcome {
        log::debug!("Session {} skipped reconcile: {}", self.id, reason);
        ReconcileOutcome::Skipped(reason)
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn pen(&self) -> &StrokeStyle {
        &self.pen
    }

    /// Style for the next stroke; a stroke in progress keeps its own.
    pub fn set_pen(&mut self, pen: StrokeStyle) {
        self.pen = pen;
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn active_strokes(&self) -> &[Stroke] {
        self.history.active_strokes()
    }

    pub fn is_drawing(&self) -> bool {
        self.buffer.is_drawing()
    }

    pub fn current_stroke(&self) -> Option<&Stroke> {
        self.buffer.current()
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn persistence(&self) -> &PersistenceAdapter<S> {
        &self.persistence
    }

    pub fn sink(&self) -> &D {
        &self.sink
    }

    pub fn redraw_count(&self) -> u64 {
        self.dispatcher.redraw_count()
    }
}
