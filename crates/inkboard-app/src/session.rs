//! Session runtime.
//!
//! Pointer commands and reconciler ticks share one queue, so the whiteboard
//! only ever sees one mutation at a time. Store I/O runs alongside the queue:
//! at most one load and one save are polled at any moment, and neither holds
//! up input handling.

use crate::error::{AppError, AppResult};
use inkboard_core::{
    BlobStore, BoxFuture, DrawingSink, PendingLoad, PointerEvent, StrokeStyle, Whiteboard,
};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Capacity of the session command queue.
const COMMAND_QUEUE_CAPACITY: usize = 256;

/// Something for the session to do.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Pointer(PointerEvent),
    Undo,
    Redo,
    SetPen(StrokeStyle),
    /// Reconciliation timer fired.
    Tick,
    Shutdown,
}

/// Timer task feeding `Tick` into the session queue.
///
/// Aborted by `cancel` or on drop.
pub struct ReconcileTimer {
    handle: JoinHandle<()>,
}

impl ReconcileTimer {
    /// Spawn the timer. The first tick fires one `period` after spawning.
    pub fn spawn(period: Duration, commands: mpsc::Sender<SessionCommand>) -> Self {
        let period = period.max(Duration::from_millis(1));
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                match commands.try_send(SessionCommand::Tick) {
                    Ok(()) => {}
                    // The session is busy; this tick is dropped.
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        log::debug!("Reconcile tick dropped, session queue full");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => break,
                }
            }
        });
        Self { handle }
    }

    /// Stop the timer.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for ReconcileTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Input side of a running session.
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    timer: Option<ReconcileTimer>,
}

impl SessionHandle {
    /// Create the session queue and start its reconcile timer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(reconcile_interval: Duration) -> (Self, mpsc::Receiver<SessionCommand>) {
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        let timer = ReconcileTimer::spawn(reconcile_interval, tx.clone());
        let handle = Self {
            commands: tx,
            timer: Some(timer),
        };
        (handle, rx)
    }

    pub async fn send(&self, command: SessionCommand) -> AppResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| AppError::SessionClosed)
    }

    /// Stop the timer and ask the session loop to finish.
    pub async fn shutdown(mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        // The loop may already be gone.
        let _ = self.commands.send(SessionCommand::Shutdown).await;
    }
}

/// Drive `whiteboard` from `commands` until shutdown or until every sender
/// is gone, then flush staged saves and hand the whiteboard back.
///
/// `on_remote_change` runs after each adopted remote snapshot has been
/// redrawn.
pub async fn run_session<S, D, F>(
    mut whiteboard: Whiteboard<S, D>,
    mut commands: mpsc::Receiver<SessionCommand>,
    mut on_remote_change: F,
) -> Whiteboard<S, D>
where
    S: BlobStore + 'static,
    D: DrawingSink,
    F: FnMut(&Whiteboard<S, D>),
{
    let mut load: Option<PendingLoad> = None;
    let mut save: Option<BoxFuture<'static, ()>> = None;

    loop {
        if save.is_none() {
            save = whiteboard.take_save();
        }

        tokio::select! {
            biased;

            command = commands.recv() => match command {
                None | Some(SessionCommand::Shutdown) => break,
                Some(SessionCommand::Tick) => match whiteboard.begin_reconcile() {
                    Ok(pending) => load = Some(pending),
                    Err(reason) => {
                        log::debug!("Session {} skipped reconcile: {}", whiteboard.id(), reason)
                    }
                },
                Some(command) => apply(&mut whiteboard, command),
            },

            remote = poll_slot(&mut load) => {
                load = None;
                if whiteboard.finish_reconcile(remote).is_adopted() {
                    on_remote_change(&whiteboard);
                }
            }

            () = poll_slot(&mut save) => {
                save = None;
            }
        }
    }

    drop(load);
    if let Some(save) = save.take() {
        save.await;
    }
    whiteboard.flush().await;
    log::info!("Session {} ended at v{}", whiteboard.id(), whiteboard.history().version());
    whiteboard
}

fn apply<S, D>(whiteboard: &mut Whiteboard<S, D>, command: SessionCommand)
where
    S: BlobStore + 'static,
    D: DrawingSink,
{
    match command {
        SessionCommand::Pointer(event) => {
            if let Err(e) = whiteboard.handle_pointer(event) {
                log::warn!("Ignoring {:?}: {}", event, e);
            }
        }
        SessionCommand::Undo => {
            whiteboard.undo();
        }
        SessionCommand::Redo => {
            whiteboard.redo();
        }
        SessionCommand::SetPen(pen) => whiteboard.set_pen(pen),
        SessionCommand::Tick | SessionCommand::Shutdown => {}
    }
}

/// Await the future in `slot`, or never complete if it is empty.
async fn poll_slot<T>(slot: &mut Option<BoxFuture<'static, T>>) -> T {
    match slot {
        Some(fut) => fut.await,
        None => std::future::pending().await,
    }
}

/// Run `session` and `driver` together on the current task.
pub async fn drive<W, A>(session: W, driver: A) -> W::Output
where
    W: Future,
    A: Future<Output = ()>,
{
    let (whiteboard, ()) = tokio::join!(session, driver);
    whiteboard
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkboard_core::{MemoryStore, RecordingSink, ReconcileOutcome, WhiteboardConfig};
    use std::sync::Arc;

    type Board = Whiteboard<MemoryStore, RecordingSink>;

    fn board(store: &Arc<MemoryStore>) -> Board {
        Whiteboard::new(Arc::clone(store), RecordingSink::new(), WhiteboardConfig::default())
    }

    async fn stroke(handle: &SessionHandle, from: (f64, f64), to: (f64, f64)) {
        for command in [
            SessionCommand::Pointer(PointerEvent::down(from.0, from.1)),
            SessionCommand::Pointer(PointerEvent::moved(to.0, to.1)),
            SessionCommand::Pointer(PointerEvent::Up),
        ] {
            handle.send(command).await.unwrap();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_are_applied_and_saved() {
        let store = Arc::new(MemoryStore::new());
        let (handle, rx) = SessionHandle::start(Duration::from_secs(1));

        let session = run_session(board(&store), rx, |_| {});
        let driver = async {
            stroke(&handle, (0.0, 0.0), (1.0, 1.0)).await;
            stroke(&handle, (2.0, 2.0), (3.0, 3.0)).await;
            handle.send(SessionCommand::Undo).await.unwrap();
            handle.shutdown().await;
        };
        let whiteboard = drive(session, driver).await;

        assert_eq!(whiteboard.history().len(), 2);
        assert_eq!(whiteboard.history().cursor(), 1);
        assert!(!whiteboard.has_unpublished_changes());
        let stored = whiteboard.persistence().load().await.unwrap();
        assert_eq!(stored, whiteboard.history().snapshot());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_adopts_remote_changes() {
        let store = Arc::new(MemoryStore::new());

        let mut alice = board(&store);
        alice.pointer_down(kurbo::Point::new(0.0, 0.0)).unwrap();
        alice.pointer_move(kurbo::Point::new(8.0, 8.0));
        alice.pointer_up().unwrap();
        alice.flush().await;

        let (handle, rx) = SessionHandle::start(Duration::from_secs(1));
        let mut adoptions = 0;
        let session = run_session(board(&store), rx, |_| adoptions += 1);
        let driver = async {
            tokio::time::sleep(Duration::from_millis(3500)).await;
            handle.shutdown().await;
        };
        let bob = drive(session, driver).await;

        // Three ticks, one adoption.
        assert_eq!(adoptions, 1);
        assert_eq!(bob.history().snapshot(), alice.history().snapshot());
        assert_eq!(bob.sink().visible(), alice.active_strokes());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_adoption_while_pointer_held() {
        let store = Arc::new(MemoryStore::new());

        let mut alice = board(&store);
        alice.pointer_down(kurbo::Point::new(0.0, 0.0)).unwrap();
        alice.pointer_up().unwrap();
        alice.flush().await;

        let (handle, rx) = SessionHandle::start(Duration::from_secs(1));
        let session = run_session(board(&store), rx, |_| {});
        let driver = async {
            handle
                .send(SessionCommand::Pointer(PointerEvent::down(5.0, 5.0)))
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(2500)).await;
            handle.shutdown().await;
        };
        let bob = drive(session, driver).await;

        assert!(bob.is_drawing());
        assert!(bob.history().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_stops_after_cancel() {
        let (tx, mut rx) = mpsc::channel(8);
        let timer = ReconcileTimer::spawn(Duration::from_secs(1), tx);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(rx.recv().await, Some(SessionCommand::Tick));

        timer.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;
        // The sender lived in the aborted task, so the queue closes empty.
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_ends_when_senders_drop() {
        let store = Arc::new(MemoryStore::new());
        let (handle, rx) = SessionHandle::start(Duration::from_secs(1));

        let session = run_session(board(&store), rx, |_| {});
        let driver = async {
            stroke(&handle, (0.0, 0.0), (4.0, 0.0)).await;
            drop(handle);
        };
        let whiteboard = drive(session, driver).await;

        assert_eq!(whiteboard.history().len(), 1);
        assert_eq!(
            whiteboard.persistence().load().await.map(|s| s.version),
            Some(1)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconcile_outcome_after_session() {
        let store = Arc::new(MemoryStore::new());
        let (handle, rx) = SessionHandle::start(Duration::from_secs(1));

        let session = run_session(board(&store), rx, |_| {});
        let driver = async {
            stroke(&handle, (0.0, 0.0), (4.0, 0.0)).await;
            handle.shutdown().await;
        };
        let mut whiteboard = drive(session, driver).await;

        // Everything was published, and the store holds our own version.
        assert_eq!(
            whiteboard.reconcile().await,
            ReconcileOutcome::Skipped(inkboard_core::SkipReason::UpToDate)
        );
    }
}
