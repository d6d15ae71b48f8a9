//! Cancellable delayed task used to settle the advisory after rapid input

use std::time::Duration;

use tokio::task::JoinHandle;

/// Delay before the advisory is refreshed after the last input change
pub const ADVISORY_DELAY: Duration = Duration::from_millis(300);

/// Runs the most recently scheduled task once no new task has been scheduled
/// for `delay`. Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(ADVISORY_DELAY)
    }
}

impl Debouncer {
    /// Create a debouncer with the given delay
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Configured delay
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `task`, aborting any task still waiting
    pub fn schedule<F>(&mut self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.cancel() {
            log::trace!("Rescheduled debounced task");
        }
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        }));
    }

    /// Abort the waiting task. Returns whether one was still pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    /// Wait for the pending task to run instead of dropping it. Returns whether
    /// a task was still waiting.
    pub async fn settle(&mut self) -> bool {
        let Some(handle) = self.pending.take() else {
            return false;
        };
        let waiting = !handle.is_finished();
        if let Err(e) = handle.await {
            log::warn!("Debounced task did not complete: {}", e);
        }
        waiting
    }

    /// Whether a task is scheduled and has not run yet
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .map_or(false, |handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
