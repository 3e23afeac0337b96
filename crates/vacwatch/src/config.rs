//! CLI configuration: thin wrapper around `vacwatch_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` overrides (--config,
//! --state-file, --timeout, --api-base) and builds the core objects every
//! command needs.

use std::path::PathBuf;
use std::sync::Arc;

use vacwatch_core::{Dashboard, FileStore, Notifier, SettingsStore, Watcher, WatcherConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use vacwatch_config::{Config, config_path, load_config_from, save_config};

// ── Context ─────────────────────────────────────────────────────────

/// Resolved configuration for one invocation.
pub struct Context {
    pub config: Config,
    pub config_file: PathBuf,
    api_base: Option<String>,
}

impl Context {
    /// Load the config file (or `--config`) and apply flag overrides.
    pub fn load(global: &GlobalOpts) -> Result<Self, CliError> {
        let config_file = config_file(global);
        let mut config = load_config_from(&config_file)?;

        if let Some(ref path) = global.state_file {
            config.state_file = Some(path.clone());
        }
        if let Some(timeout) = global.timeout {
            if timeout == 0 {
                return Err(CliError::Validation {
                    field: "timeout".into(),
                    reason: "must be greater than zero".into(),
                });
            }
            config.api.timeout_secs = timeout;
        }

        Ok(Self {
            config,
            config_file,
            api_base: global.api_base.clone(),
        })
    }

    pub fn state_file(&self) -> PathBuf {
        self.config.state_file_path()
    }

    pub fn open_store(&self) -> Result<Arc<FileStore>, CliError> {
        let path = self.state_file();
        tracing::debug!(path = %path.display(), "opening state file");
        Ok(Arc::new(FileStore::open(path)?))
    }

    pub fn watcher_config(&self) -> WatcherConfig {
        self.config.to_watcher_config()
    }

    pub fn watcher(
        &self,
        config: WatcherConfig,
        store: Arc<dyn SettingsStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Watcher, CliError> {
        Ok(Watcher::new(config, store, notifier)?)
    }

    /// `--api-base`, if given.
    pub fn api_base_flag(&self) -> Option<&str> {
        self.api_base.as_deref()
    }

    /// API base for read-only views: flag, then `[api] base_url`, then the
    /// stored poll settings.
    pub fn dashboard_base(&self, store: &dyn SettingsStore) -> String {
        self.api_base
            .clone()
            .or_else(|| self.config.api.base_url.clone())
            .unwrap_or_else(|| store.load().settings.api_base)
    }

    pub fn dashboard(&self) -> Result<Dashboard, CliError> {
        let store = self.open_store()?;
        let base = self.dashboard_base(store.as_ref());
        Ok(Dashboard::new(&base, &self.config.to_transport())?)
    }
}

/// Config file path: `--config`, else the platform default.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}
