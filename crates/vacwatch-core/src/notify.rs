// ── Notifier port ──
//
// How a poll result reaches the user: a one-off alert when the count goes
// up, and a persistent badge that shows the last delta until the next
// poll clears it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tracing::info;
use uuid::Uuid;

/// Badge background color.
pub const BADGE_COLOR: &str = "#E11D48";

const ALERT_TITLE: &str = "New vacancies";
const EVENT_CHANNEL_SIZE: usize = 64;

/// Raised when the count grows past a non-zero baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VacancyAlert {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub delta: u64,
    pub count: u64,
    pub raised_at: DateTime<Utc>,
}

impl VacancyAlert {
    pub fn new(delta: u64, count: u64, raised_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: ALERT_TITLE.into(),
            message: format!("New vacancies: {delta}"),
            delta,
            count,
            raised_at,
        }
    }
}

/// Persistent indicator next to the app name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Badge {
    Count { text: String, color: &'static str },
    #[default]
    Cleared,
}

impl Badge {
    pub fn delta(delta: u64) -> Self {
        Self::Count {
            text: delta.to_string(),
            color: BADGE_COLOR,
        }
    }

    /// Badge text; empty when cleared.
    pub fn text(&self) -> &str {
        match self {
            Self::Count { text, .. } => text,
            Self::Cleared => "",
        }
    }
}

/// Sink for alerts and badge updates.
pub trait Notifier: Send + Sync {
    fn notify(&self, alert: &VacancyAlert);
    fn set_badge(&self, badge: &Badge);
}

// ── LogNotifier ──────────────────────────────────────────────────────

/// Writes alerts to the tracing log. Used headless and as a fallback.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, alert: &VacancyAlert) {
        info!(delta = alert.delta, count = alert.count, "{}", alert.message);
    }

    fn set_badge(&self, badge: &Badge) {
        tracing::debug!(badge = badge.text(), "badge updated");
    }
}

// ── ChannelNotifier ──────────────────────────────────────────────────

/// Event published by [`ChannelNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierEvent {
    Alert(VacancyAlert),
    Badge(Badge),
}

/// Publishes alerts on a broadcast channel and keeps the current badge in
/// a watch channel, for UIs running in the same process.
pub struct ChannelNotifier {
    events: broadcast::Sender<NotifierEvent>,
    badge: watch::Sender<Badge>,
}

impl ChannelNotifier {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        let (badge, _) = watch::channel(Badge::Cleared);
        Self { events, badge }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotifierEvent> {
        self.events.subscribe()
    }

    pub fn badge(&self) -> watch::Receiver<Badge> {
        self.badge.subscribe()
    }
}

impl Default for ChannelNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, alert: &VacancyAlert) {
        // No subscribers is fine: the alert is also in the log.
        let _ = self.events.send(NotifierEvent::Alert(alert.clone()));
    }

    fn set_badge(&self, badge: &Badge) {
        self.badge.send_replace(badge.clone());
        let _ = self.events.send(NotifierEvent::Badge(badge.clone()));
    }
}

// ── FanoutNotifier ───────────────────────────────────────────────────

/// Forwards to several notifiers in order.
#[derive(Default, Clone)]
pub struct FanoutNotifier {
    sinks: Vec<Arc<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn Notifier>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl Notifier for FanoutNotifier {
    fn notify(&self, alert: &VacancyAlert) {
        for sink in &self.sinks {
            sink.notify(alert);
        }
    }

    fn set_badge(&self, badge: &Badge) {
        for sink in &self.sinks {
            sink.set_badge(badge);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_text() {
        let alert = VacancyAlert::new(5, 15, Utc::now());
        assert_eq!(alert.title, "New vacancies");
        assert_eq!(alert.message, "New vacancies: 5");
    }

    #[test]
    fn badge_text_and_color() {
        let badge = Badge::delta(5);
        assert_eq!(badge.text(), "5");
        assert!(matches!(badge, Badge::Count { color: BADGE_COLOR, .. }));
        assert_eq!(Badge::Cleared.text(), "");
    }

    #[test]
    fn fanout_reaches_every_sink() {
        let a = Arc::new(ChannelNotifier::new());
        let b = Arc::new(ChannelNotifier::new());
        let fanout = FanoutNotifier::new().with(a.clone()).with(b.clone());

        fanout.set_badge(&Badge::delta(2));

        assert_eq!(a.badge().borrow().text(), "2");
        assert_eq!(b.badge().borrow().text(), "2");
    }

    #[test]
    fn channel_publishes_alerts() {
        let notifier = ChannelNotifier::new();
        let mut rx = notifier.subscribe();
        notifier.notify(&VacancyAlert::new(1, 3, Utc::now()));

        match rx.try_recv() {
            Ok(NotifierEvent::Alert(alert)) => assert_eq!(alert.delta, 1),
            other => panic!("expected alert, got {other:?}"),
        }
    }
}
