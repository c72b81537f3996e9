//! Quiet-period scheduler.
//!
//! Each scheduled job waits out the delay and runs only if nothing newer was
//! scheduled in the meantime. A job that has already started is never
//! cancelled by a later schedule.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// Delay used by keystroke-driven conversions.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

struct Pending {
    handle: JoinHandle<()>,
    fired: Arc<AtomicBool>,
}

/// Debouncer backed by tokio timers. Must be used inside a runtime.
pub struct Debouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
    pending: Mutex<Option<Pending>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules `job` to run after the delay, superseding any job that has
    /// not fired yet.
    pub fn schedule<Fut>(&self, job: Fut)
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);
        let fired = Arc::new(AtomicBool::new(false));
        let delay = self.delay;

        let task_fired = Arc::clone(&fired);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Mark before checking so a concurrent schedule never aborts a started job.
            task_fired.store(true, Ordering::SeqCst);
            if generation.load(Ordering::SeqCst) != ticket {
                return;
            }
            job.await;
        });

        let previous = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(Pending { handle, fired });
        if let Some(previous) = previous {
            Self::abort_unfired(previous);
        }
    }

    /// Whether the last scheduled job is still waiting or running.
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|p| !p.handle.is_finished())
    }

    /// Drops the pending job, if it has not fired.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let previous = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(previous) = previous {
            Self::abort_unfired(previous);
        }
    }

    fn abort_unfired(pending: Pending) {
        if !pending.fired.load(Ordering::SeqCst) {
            debug!("Superseded pending debounced job");
            pending.handle.abort();
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    fn recorder() -> Arc<StdMutex<Vec<u32>>> {
        Arc::new(StdMutex::new(Vec::new()))
    }

    fn push(log: &Arc<StdMutex<Vec<u32>>>, value: u32) -> impl Future<Output = ()> + Send + 'static {
        let log = Arc::clone(log);
        async move {
            log.lock().unwrap().push(value);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_last_job_in_window_runs() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let log = recorder();

        debouncer.schedule(push(&log, 1));
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.schedule(push(&log, 2));
        tokio::time::sleep(Duration::from_millis(299)).await;
        debouncer.schedule(push(&log, 3));

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(*log.lock().unwrap(), vec![3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_after_quiet_period_runs_too() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let log = recorder();

        debouncer.schedule(push(&log, 1));
        tokio::time::sleep(Duration::from_millis(350)).await;
        debouncer.schedule(push(&log, 2));
        tokio::time::sleep(Duration::from_millis(350)).await;

        assert_eq!(*log.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_started_job_is_not_cancelled() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let log = recorder();

        let slow_log = Arc::clone(&log);
        debouncer.schedule(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            slow_log.lock().unwrap().push(1);
        });
        // Fired at 300ms, still running at 350ms.
        tokio::time::sleep(Duration::from_millis(350)).await;
        debouncer.schedule(push(&log, 2));

        tokio::time::sleep(Duration::from_secs(1)).await;
        let mut seen = log.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_job() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let log = recorder();

        debouncer.schedule(push(&log, 1));
        assert!(debouncer.is_pending());
        debouncer.cancel();
        assert!(!debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_is_pending_clears_after_job_runs() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let log = recorder();

        debouncer.schedule(push(&log, 7));
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(*log.lock().unwrap(), vec![7]);
        assert!(!debouncer.is_pending());
    }
}
