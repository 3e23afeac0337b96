// ── Poller ──
//
// One count-check cycle: read settings, query the count endpoint, compare
// with the stored baseline, notify, persist. Every failure ends up in the
// stored state; nothing escapes to the caller's loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use vacwatch_api::{HttpClient, VacancyClient};

use crate::error::CoreError;
use crate::model::{PollSettings, PollStatus};
use crate::notify::{Badge, Notifier, VacancyAlert};
use crate::store::SettingsStore;

/// Fallback for failures that carry no message.
const GENERIC_FAILURE: &str = "Request failed";

/// Time source, swappable in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// What one `poll_now` call did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PollOutcome {
    /// Polling is disabled; nothing was requested or written.
    Skipped,
    /// The count was fetched. `delta` is set when an alert was raised.
    Checked {
        count: u64,
        previous: u64,
        delta: Option<u64>,
    },
    /// The request failed; `message` is what was stored as `lastError`.
    Failed { message: String },
}

/// Runs count-check cycles against the store.
///
/// Cheap to clone; clones share the store, notifier and HTTP pool.
#[derive(Clone)]
pub struct Poller {
    store: Arc<dyn SettingsStore>,
    notifier: Arc<dyn Notifier>,
    http: HttpClient,
    clock: Arc<dyn Clock>,
}

impl Poller {
    pub fn new(
        store: Arc<dyn SettingsStore>,
        notifier: Arc<dyn Notifier>,
        http: HttpClient,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            notifier,
            http,
            clock,
        }
    }

    /// Poll once.
    ///
    /// Safe to call from several triggers at once: each call reads the
    /// current record, and each write only touches poll state, so the
    /// last writer wins.
    pub async fn poll_now(&self) -> PollOutcome {
        let record = self.store.load();
        let settings = record.settings;
        if !settings.enabled {
            debug!("polling disabled, skipping");
            return PollOutcome::Skipped;
        }

        let attempted_at = self.clock.now();

        match self.fetch_count(&settings).await {
            Ok(count) => {
                let previous = record.state.baseline();
                let delta = (previous > 0 && count > previous).then(|| count - previous);

                if let Some(delta) = delta {
                    info!(count, previous, delta, "new vacancies");
                    self.notifier
                        .notify(&VacancyAlert::new(delta, count, attempted_at));
                    self.notifier.set_badge(&Badge::delta(delta));
                } else {
                    debug!(count, previous, "no new vacancies");
                    self.notifier.set_badge(&Badge::Cleared);
                }

                let every = self.current_interval();
                self.persist(&mut |state| {
                    state.last_checked = Some(attempted_at);
                    state.last_count = Some(count);
                    state.last_error = None;
                    state.polling_status = Some(PollStatus::Ok(every).to_string());
                });

                PollOutcome::Checked {
                    count,
                    previous,
                    delta,
                }
            }
            Err(err) => {
                let mut message = err.to_string();
                if message.trim().is_empty() {
                    message = GENERIC_FAILURE.into();
                }
                warn!(error = %message, "poll failed");

                // last_count stays as the baseline for the next success.
                let stored = message.clone();
                let every = self.current_interval();
                self.persist(&mut |state| {
                    state.last_checked = Some(attempted_at);
                    state.last_error = Some(stored.clone());
                    state.polling_status = Some(PollStatus::Error(every).to_string());
                });

                PollOutcome::Failed { message }
            }
        }
    }

    async fn fetch_count(&self, settings: &PollSettings) -> Result<u64, CoreError> {
        let client = VacancyClient::with_http(self.http.clone(), &settings.api_base)?;
        Ok(client.count(&settings.count_query()).await?)
    }

    /// Interval as stored now; a save may have landed mid-request.
    fn current_interval(&self) -> Duration {
        self.store.load().settings.effective_interval()
    }

    fn persist(&self, edit: &mut dyn FnMut(&mut crate::model::PollState)) {
        if let Err(e) = self.store.modify_state(edit) {
            warn!(error = %e, "failed to persist poll state");
        }
    }
}
