// ── Recurring timers ──
//
// Timers are keyed by id. Arming an id that is already armed cancels the
// old timer first, so there is never more than one timer per id.

use std::future::Future;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

struct ArmedTimer {
    period: Duration,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ArmedTimer {
    fn stop(self) {
        self.cancel.cancel();
        // A job that is mid-flight runs to completion; the loop exits at
        // its next select.
        drop(self.handle);
    }
}

/// Registry of recurring timers.
pub struct Scheduler {
    timers: DashMap<String, ArmedTimer>,
    cancel: CancellationToken,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            timers: DashMap::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Run `job` every `period`, replacing any timer already armed as `id`.
    ///
    /// The first run happens one full period from now. Late ticks are
    /// delayed rather than bursted. Must be called inside a tokio runtime.
    pub fn arm<F, Fut>(&self, id: &str, period: Duration, job: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = self.cancel.child_token();
        let token = cancel.clone();
        let name = id.to_owned();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        debug!(timer = %name, "timer fired");
                        job().await;
                    }
                }
            }
            debug!(timer = %name, "timer stopped");
        });

        let armed = ArmedTimer {
            period,
            cancel,
            handle,
        };
        if let Some(previous) = self.timers.insert(id.to_owned(), armed) {
            debug!(timer = id, old = ?previous.period, new = ?period, "timer re-armed");
            previous.stop();
        }
    }

    /// Stop the timer registered as `id`. Returns `false` if none was armed.
    pub fn disarm(&self, id: &str) -> bool {
        match self.timers.remove(id) {
            Some((_, timer)) => {
                timer.stop();
                true
            }
            None => false,
        }
    }

    /// Currently armed timers as `(id, period)`, sorted by id.
    pub fn active(&self) -> Vec<(String, Duration)> {
        let mut active: Vec<(String, Duration)> = self
            .timers
            .iter()
            .filter(|entry| !entry.handle.is_finished())
            .map(|entry| (entry.key().clone(), entry.period))
            .collect();
        active.sort_by(|a, b| a.0.cmp(&b.0));
        active
    }

    /// Period of the timer registered as `id`.
    pub fn period(&self, id: &str) -> Option<Duration> {
        self.timers.get(id).map(|t| t.period)
    }

    /// Stop every timer.
    pub fn shutdown(&self) {
        self.cancel.cancel();
        let ids: Vec<String> = self.timers.iter().map(|e| e.key().clone()).collect();
        for id in ids {
            self.disarm(&id);
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counting_job(counter: &Arc<AtomicUsize>) -> impl Fn() -> std::future::Ready<()> + Send + Sync + 'static {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_every_period_after_the_first() {
        let scheduler = Scheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));
        scheduler.arm("poll", Duration::from_secs(10), counting_job(&hits));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(26)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_replaces_the_timer() {
        let scheduler = Scheduler::new();
        let old_hits = Arc::new(AtomicUsize::new(0));
        let new_hits = Arc::new(AtomicUsize::new(0));

        scheduler.arm("poll", Duration::from_secs(10), counting_job(&old_hits));
        scheduler.arm("poll", Duration::from_secs(30), counting_job(&new_hits));

        assert_eq!(
            scheduler.active(),
            vec![("poll".to_owned(), Duration::from_secs(30))]
        );

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(old_hits.load(Ordering::SeqCst), 0);
        assert_eq!(new_hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn disarm_and_shutdown() {
        let scheduler = Scheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));
        scheduler.arm("a", Duration::from_secs(10), counting_job(&hits));
        scheduler.arm("b", Duration::from_secs(10), counting_job(&hits));

        assert!(scheduler.disarm("a"));
        assert!(!scheduler.disarm("a"));
        assert_eq!(scheduler.period("b"), Some(Duration::from_secs(10)));

        scheduler.shutdown();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(scheduler.active().is_empty());
    }
}
