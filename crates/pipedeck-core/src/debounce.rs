//! Last-call-wins debouncing on the tokio runtime.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Delays a callback until calls stop arriving for a quiet period.
///
/// Each [`Debouncer::schedule`] aborts the previously pending timer, so only
/// the last callback of a burst runs. Dropping the debouncer aborts the
/// pending timer. Callbacks run synchronously once the timer elapses; spawn
/// from them when the follow-up work is async and must outlive the timer.
#[derive(Debug, Default)]
pub struct Debouncer {
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    /// Debouncer with no pending callback.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `callback` after `delay` unless another call arrives first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, delay: Duration, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        });
        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(timer);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Abort the pending callback, returning whether one was waiting.
    pub fn cancel(&self) -> bool {
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        pending.is_some_and(|timer| {
            let waiting = !timer.is_finished();
            timer.abort();
            waiting
        })
    }

    /// Whether a callback is still waiting for its timer.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        let pending = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(timer) = pending {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    type Fired = Arc<Mutex<Vec<&'static str>>>;

    fn record(fired: &Fired, label: &'static str) -> impl FnOnce() + Send + 'static {
        let fired = Arc::clone(fired);
        move || fired.lock().expect("fired").push(label)
    }

    #[tokio::test(start_paused = true)]
    async fn burst_fires_only_the_last_callback() {
        let fired = Fired::default();
        let debouncer = Debouncer::new();
        let delay = Duration::from_millis(200);

        debouncer.schedule(delay, record(&fired, "a"));
        tokio::time::sleep(Duration::from_millis(50)).await;
        debouncer.schedule(delay, record(&fired, "ab"));
        tokio::time::sleep(Duration::from_millis(50)).await;
        debouncer.schedule(delay, record(&fired, "abc"));
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(*fired.lock().expect("fired"), ["abc"]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn quiet_periods_fire_separately() {
        let fired = Fired::default();
        let debouncer = Debouncer::new();
        let delay = Duration::from_millis(100);

        debouncer.schedule(delay, record(&fired, "first"));
        tokio::time::sleep(Duration::from_millis(150)).await;
        debouncer.schedule(delay, record(&fired, "second"));
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(*fired.lock().expect("fired"), ["first", "second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_and_drop_abort_the_timer() {
        let fired = Fired::default();
        let debouncer = Debouncer::new();
        debouncer.schedule(Duration::from_millis(100), record(&fired, "cancelled"));
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());

        debouncer.schedule(Duration::from_millis(100), record(&fired, "dropped"));
        drop(debouncer);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(fired.lock().expect("fired").is_empty());
    }
}
