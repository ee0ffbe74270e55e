//! Debounced Task
//!
//! A cancellable deferred task: scheduling replaces whatever run is pending.

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

/// Runs the most recently scheduled future after a fixed delay.
///
/// Each call to [`Debouncer::schedule`] aborts the pending run if its delay has
/// not elapsed yet and starts a new delay. Dropping the debouncer aborts
/// whatever is pending.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Schedules `task` to run after the delay, cancelling any pending run.
    ///
    /// Returns false when called outside a tokio runtime; nothing is scheduled
    /// in that case.
    pub fn schedule<F>(&self, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Ok(handle) = Handle::try_current() else {
            debug!("No tokio runtime available, skipping scheduled task");
            return false;
        };

        let delay = self.delay;
        // Only the delay is abortable; a run that has started finishes on its own
        let next = handle.spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(task);
        });

        if let Some(previous) = self.pending.lock().replace(next) {
            previous.abort();
        }
        true
    }

    /// Aborts the pending run, if any.
    pub fn cancel(&self) {
        if let Some(pending) = self.pending.lock().take() {
            pending.abort();
        }
    }

    /// True while a scheduled run is still waiting out its delay.
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
