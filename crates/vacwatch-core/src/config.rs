// ── Runtime configuration for the watcher ──
//
// Built by the config crate (or by hand in tests) and handed to
// `Watcher::new`. Holds no secrets and nothing that is persisted in the
// state record itself.

use std::time::Duration;

use vacwatch_api::TransportConfig;

use crate::model::{PollSettings, PushOptions};

/// How often a running watcher checks the state file for outside edits.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(2);

/// Configuration for a [`Watcher`](crate::Watcher).
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// HTTP timeout and user agent.
    pub transport: TransportConfig,
    /// Settings written on first install.
    pub defaults: PollSettings,
    /// Polling-settings push behaviour.
    pub push: PushOptions,
    /// Period for picking up edits made by other processes.
    pub sync_interval: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            defaults: PollSettings::default(),
            push: PushOptions::default(),
            sync_interval: DEFAULT_SYNC_INTERVAL,
        }
    }
}
