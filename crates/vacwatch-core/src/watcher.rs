// ── Watcher ──
//
// Lifecycle facade around the poller: install defaults, arm the poll
// timer, poll on demand, save settings (re-arm + poll + best-effort push),
// and follow edits made to the state file by other processes.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use vacwatch_api::{HttpClient, PollingSettingsPush, VacancyClient};

use crate::config::WatcherConfig;
use crate::error::CoreError;
use crate::model::{PollSettings, PollStatus, Record};
use crate::notify::Notifier;
use crate::poller::{Clock, PollOutcome, Poller, SystemClock};
use crate::scheduler::Scheduler;
use crate::store::{RefreshOutcome, SettingsStore};

/// Id of the recurring poll timer.
pub const POLL_TIMER_ID: &str = "poll-vacancies";

// ── Save reporting ───────────────────────────────────────────────

/// Outcome of the polling-settings push that follows a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PushResult {
    Sent,
    /// Pushing is turned off in the config.
    Disabled,
    /// The push failed; the local save still stands.
    Failed { message: String },
}

/// What `save_settings` did besides persisting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    pub interval_secs: u64,
    pub push: PushResult,
}

// ── Watcher ──────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<WatcherInner>`. Owns the poll timer and any
/// background tasks; call [`shutdown()`](Self::shutdown) to stop them.
#[derive(Clone)]
pub struct Watcher {
    inner: Arc<WatcherInner>,
}

struct WatcherInner {
    config: WatcherConfig,
    store: Arc<dyn SettingsStore>,
    poller: Poller,
    http: HttpClient,
    scheduler: Scheduler,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Watcher {
    /// Create a watcher. Does NOT arm the timer -- call
    /// [`start()`](Self::start) for install/startup behaviour.
    pub fn new(
        config: WatcherConfig,
        store: Arc<dyn SettingsStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, CoreError> {
        Self::with_clock(config, store, notifier, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: WatcherConfig,
        store: Arc<dyn SettingsStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CoreError> {
        let http = config.transport.build_client()?;
        let poller = Poller::new(Arc::clone(&store), notifier, http.clone(), clock);

        Ok(Self {
            inner: Arc::new(WatcherInner {
                config,
                store,
                poller,
                http,
                scheduler: Scheduler::new(),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Current settings and state.
    pub fn snapshot(&self) -> Record {
        self.inner.store.load()
    }

    /// Live record updates.
    pub fn subscribe(&self) -> watch::Receiver<Record> {
        self.inner.store.subscribe()
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Install/startup: persist defaults if nothing is stored, arm the
    /// poll timer, and poll immediately.
    pub async fn start(&self) -> Result<PollOutcome, CoreError> {
        if self
            .inner
            .store
            .install_defaults(&self.inner.config.defaults)?
        {
            info!("first run, default settings installed");
        }
        self.rearm();
        Ok(self.inner.poller.poll_now().await)
    }

    /// Poll now, on demand.
    pub async fn poll_now(&self) -> PollOutcome {
        self.inner.poller.poll_now().await
    }

    /// Arm (or re-arm) the poll timer from the stored interval.
    ///
    /// Re-arming replaces the existing timer, so exactly one poll timer
    /// is ever active. Returns the effective period.
    pub fn rearm(&self) -> Duration {
        let settings = self.inner.store.load().settings;
        let every = settings.effective_interval();

        let poller = self.inner.poller.clone();
        self.inner.scheduler.arm(POLL_TIMER_ID, every, move || {
            let poller = poller.clone();
            async move {
                poller.poll_now().await;
            }
        });

        let status = if settings.enabled {
            PollStatus::Scheduled(every)
        } else {
            PollStatus::Disabled
        };
        if let Err(e) = self
            .inner
            .store
            .modify_state(&mut |s| s.polling_status = Some(status.to_string()))
        {
            warn!(error = %e, "failed to store polling status");
        }

        info!(
            interval_secs = every.as_secs(),
            enabled = settings.enabled,
            "poll timer armed"
        );
        every
    }

    /// Armed timers as `(id, period)`.
    pub fn active_timers(&self) -> Vec<(String, Duration)> {
        self.inner.scheduler.active()
    }

    /// Persist new settings, re-arm the timer, poll, then push the filters
    /// to the API.
    ///
    /// The poll is awaited so its status line reflects this save's interval.
    ///
    /// The push is best-effort: its failure is reported in the returned
    /// [`SaveReport`] and never undoes the local save.
    pub async fn save_settings(&self, settings: PollSettings) -> Result<SaveReport, CoreError> {
        let settings = settings.normalized();
        settings.validate()?;
        self.inner.store.save_settings(&settings)?;
        debug!(title = %settings.title, "settings saved");

        let every = self.rearm();
        self.inner.poller.poll_now().await;

        let push = self.push_settings(&settings).await;
        Ok(SaveReport {
            interval_secs: every.as_secs(),
            push,
        })
    }

    async fn push_settings(&self, settings: &PollSettings) -> PushResult {
        let options = &self.inner.config.push;
        if !options.enabled {
            return PushResult::Disabled;
        }

        let payload = settings.push_payload(options);
        match push(&self.inner.http, &settings.api_base, &payload).await {
            Ok(()) => {
                debug!("polling settings pushed");
                PushResult::Sent
            }
            Err(e) => {
                warn!(error = %e, "polling settings push failed, local save kept");
                PushResult::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    /// Start following edits made to the store by other processes.
    ///
    /// When settings change on disk the timer is re-armed and a poll runs,
    /// exactly as after a local save (minus the push).
    pub async fn watch_external(&self) {
        let cancel = self.inner.cancel.child_token();
        let period = self.inner.config.sync_interval;
        let handle = tokio::spawn(sync_task(self.clone(), period, cancel));
        self.inner.task_handles.lock().await.push(handle);
    }

    /// Stop the timer and all background tasks.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        self.inner.scheduler.shutdown();

        // Release the lock before awaiting: a sync task may need it to
        // register a poll on its way out.
        let handles: Vec<_> = self.inner.task_handles.lock().await.drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }
        debug!("watcher stopped");
    }

    async fn spawn_poll(&self) {
        if self.inner.cancel.is_cancelled() {
            return;
        }
        let poller = self.inner.poller.clone();
        let handle = tokio::spawn(async move {
            poller.poll_now().await;
        });

        let mut handles = self.inner.task_handles.lock().await;
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }
}

async fn push(
    http: &HttpClient,
    api_base: &str,
    payload: &PollingSettingsPush,
) -> Result<(), CoreError> {
    let client = VacancyClient::with_http(http.clone(), api_base)?;
    client.push_polling_settings(payload).await?;
    Ok(())
}

// ── Background tasks ─────────────────────────────────────────────

async fn sync_task(watcher: Watcher, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                match watcher.inner.store.refresh() {
                    Ok(RefreshOutcome::SettingsChanged) => {
                        info!("settings changed on disk, re-arming");
                        watcher.rearm();
                        watcher.spawn_poll().await;
                    }
                    Ok(RefreshOutcome::StateChanged | RefreshOutcome::Unchanged) => {}
                    Err(e) => warn!(error = %e, "failed to refresh state file"),
                }
            }
        }
    }
}
