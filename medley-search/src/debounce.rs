//! Cancellable quiet-period timer for keystroke-driven searches.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs a task once input has been quiet for a delay.
///
/// Each [`Debouncer::schedule`] replaces the pending timer. When the timer
/// fires the task is spawned on its own, so later calls no longer affect it.
/// Dropping the debouncer cancels a pending timer.
#[derive(Debug, Default)]
pub struct Debouncer {
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// Creates a debouncer with nothing scheduled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the timer for `task`, cancelling any previously scheduled one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(task);
        }));
    }

    /// Drops the pending timer, if any. Tasks already started keep running.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Whether a timer is armed and has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;
    use tokio::sync::mpsc::error::TryRecvError;

    use super::*;

    const DELAY: Duration = Duration::from_millis(1000);

    #[tokio::test(start_paused = true)]
    async fn test_rapid_schedules_collapse_to_last() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new();

        for query in ["m", "ma", "mar", "mario"] {
            let tx = tx.clone();
            debouncer.schedule(DELAY, async move {
                let _ = tx.send(query);
            });
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        assert!(debouncer.is_pending());

        assert_eq!(rx.recv().await, Some("mario"));
        tokio::time::sleep(DELAY * 3).await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_waits_for_quiet_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new();

        debouncer.schedule(DELAY, async move {
            let _ = tx.send(());
        });

        tokio::time::sleep(DELAY / 2).await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

        assert_eq!(rx.recv().await, Some(()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_task() {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        let mut debouncer = Debouncer::new();

        debouncer.schedule(DELAY, async move {
            let _ = tx.send(());
        });
        debouncer.cancel();
        assert!(!debouncer.is_pending());

        // Sender dropped with the aborted timer, so the channel closes empty
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        {
            let mut debouncer = Debouncer::new();
            debouncer.schedule(DELAY, async move {
                let _ = tx.send(());
            });
        }

        assert_eq!(rx.recv().await, None);
    }
}
