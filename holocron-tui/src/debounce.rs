//! Debounced trigger.
//!
//! Collapses a burst of [`Debouncer::schedule`] calls into one callback
//! invocation, fired `delay` after the last call of the burst.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

type Callback = Box<dyn FnMut() + Send>;

/// Trailing-edge debouncer.
///
/// Must be used inside a tokio runtime. Dropping the debouncer cancels any
/// pending invocation.
pub struct Debouncer {
    delay: Duration,
    callback: Arc<Mutex<Callback>>,
    generation: Arc<AtomicU64>,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new<F>(delay: Duration, callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        Self {
            delay,
            callback: Arc::new(Mutex::new(Box::new(callback))),
            generation: Arc::new(AtomicU64::new(0)),
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancel any pending invocation and schedule a new one.
    pub fn schedule(&mut self) {
        self.cancel();
        let scheduled = self.generation.load(Ordering::SeqCst);
        let generation = Arc::clone(&self.generation);
        let callback = Arc::clone(&self.callback);
        let delay = self.delay;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut callback = callback.lock().unwrap_or_else(PoisonError::into_inner);
            // A cancel that raced with the timer wins.
            if generation.load(Ordering::SeqCst) == scheduled {
                (callback)();
            }
        }));
    }

    /// Replace the callback. A pending invocation runs the new one.
    pub fn rebind<F>(&self, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        *self.callback.lock().unwrap_or_else(PoisonError::into_inner) = Box::new(callback);
    }

    /// Cancel the pending invocation, if any.
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

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

impl std::fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, Instant};

    fn recorder() -> (Arc<Mutex<Vec<Duration>>>, Instant) {
        (Arc::new(Mutex::new(Vec::new())), Instant::now())
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_fires_once_after_last_call() {
        let (fired, start) = recorder();
        let record = Arc::clone(&fired);
        let mut debouncer = Debouncer::new(Duration::from_millis(500), move || {
            record.lock().unwrap().push(start.elapsed());
        });

        // "a", "an", "ana" at 0, 100 and 150 ms.
        debouncer.schedule();
        sleep(Duration::from_millis(100)).await;
        debouncer.schedule();
        sleep(Duration::from_millis(50)).await;
        debouncer.schedule();

        sleep(Duration::from_millis(499)).await;
        assert!(fired.lock().unwrap().is_empty());

        sleep(Duration::from_millis(10)).await;
        let fired = fired.lock().unwrap();
        assert_eq!(fired.len(), 1);
        assert!(fired[0] >= Duration::from_millis(650));
        assert!(fired[0] < Duration::from_millis(660));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rebind_uses_latest_callback() {
        let (fired, _) = recorder();
        let mut debouncer = Debouncer::new(Duration::from_millis(500), || {});
        debouncer.schedule();

        let record = Arc::clone(&fired);
        debouncer.rebind(move || record.lock().unwrap().push(Duration::ZERO));

        sleep(Duration::from_millis(600)).await;
        assert_eq!(fired.lock().unwrap().len(), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_and_drop_suppress_invocation() {
        let (fired, _) = recorder();
        let record = Arc::clone(&fired);
        let mut debouncer = Debouncer::new(Duration::from_millis(500), move || {
            record.lock().unwrap().push(Duration::ZERO);
        });

        debouncer.schedule();
        assert!(debouncer.is_pending());
        debouncer.cancel();
        sleep(Duration::from_millis(600)).await;
        assert!(fired.lock().unwrap().is_empty());

        debouncer.schedule();
        drop(debouncer);
        sleep(Duration::from_millis(600)).await;
        assert!(fired.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_fire_separately() {
        let (fired, _) = recorder();
        let record = Arc::clone(&fired);
        let mut debouncer = Debouncer::new(Duration::from_millis(100), move || {
            record.lock().unwrap().push(Duration::ZERO);
        });

        debouncer.schedule();
        sleep(Duration::from_millis(150)).await;
        debouncer.schedule();
        sleep(Duration::from_millis(150)).await;
        assert_eq!(fired.lock().unwrap().len(), 2);
    }
}
