//! Simulated execution progress.
//!
//! The query service reports nothing while it works, so the progress bar is
//! purely cosmetic: it creeps up by small random steps and never reaches the
//! end until the execution actually completes.

use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Highest value progress can reach while an execution is running.
pub const PROGRESS_CEILING: u8 = 98;

/// Value progress is forced to on completion.
pub const PROGRESS_DONE: u8 = 100;

/// Monotonically non-decreasing progress value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress(u8);

impl Progress {
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Back to zero for a new execution.
    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Adds `step`, saturating at [`PROGRESS_CEILING`].
    pub fn advance(&mut self, step: u8) {
        if self.0 >= PROGRESS_CEILING {
            return;
        }
        self.0 = self.0.saturating_add(step).min(PROGRESS_CEILING);
    }

    /// Advances by a random step in `1..=max_step`.
    pub fn tick<R: Rng>(&mut self, rng: &mut R, max_step: u8) {
        let step = rng.random_range(1..=max_step.max(1));
        self.advance(step);
    }

    pub fn complete(&mut self) {
        self.0 = PROGRESS_DONE;
    }

    pub fn is_complete(&self) -> bool {
        self.0 >= PROGRESS_DONE
    }
}

/// Background timer that fires a callback on a fixed interval until stopped.
///
/// The callback returns `false` to stop the timer on its own (for example
/// when its channel has closed). Dropping the ticker also stops it.
pub struct ProgressTicker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ProgressTicker {
    /// Spawns the timer on the current tokio runtime.
    pub fn spawn<F>(interval: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick of an interval completes immediately.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if !on_tick() {
                            break;
                        }
                    }
                }
            }
            trace!("Progress ticker stopped");
        });

        Self { cancel, handle }
    }

    /// Stops the timer. No callback runs after the task observes this.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Returns true once the timer task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
