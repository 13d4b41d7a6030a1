use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Periodic tick source owned by a session's lifetime.
///
/// Delivers one unit per period over the returned channel; the driver applies
/// each unit to the engine's `tick()` and persists. The task is torn down
/// deterministically: `stop` is idempotent, the workflow stops the ticker on
/// cancel and on successful finalize, and dropping the ticker aborts the task
/// as a last resort — no tick can fire against a disposed session.
pub struct SessionTicker {
    handle: JoinHandle<()>,
}

impl SessionTicker {
    /// Spawn a ticker with the given period (one second for the session
    /// timer). Must be called within a tokio runtime.
    #[must_use]
    pub fn spawn(period: Duration) -> (Self, mpsc::UnboundedReceiver<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // An interval's first tick resolves immediately; the session
            // timer starts counting after one full period.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(()).is_err() {
                    break;
                }
            }
        });
        (Self { handle }, rx)
    }

    /// Stop the ticker. Idempotent; no ticks are delivered afterwards.
    pub fn stop(&self) {
        self.handle.abort();
    }

    /// Whether the underlying task has terminated.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for SessionTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
