//! Shared configuration for the vacwatch CLI and TUI.
//!
//! TOML file + `VACWATCH_*` environment, merged with figment, and
//! translated to `vacwatch_core::WatcherConfig`. Both binaries depend on
//! this crate; the CLI layers its `GlobalOpts` overrides on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vacwatch_core::{PollSettings, PushOptions, TransportConfig, WatcherConfig};

/// Environment prefix; nested keys use `__`, e.g. `VACWATCH_API__TIMEOUT_SECS`.
pub const ENV_PREFIX: &str = "VACWATCH_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// State file location. Defaults to `state.json` in the data dir.
    pub state_file: Option<PathBuf>,

    #[serde(default)]
    pub api: ApiSection,

    /// Seed settings written on first install.
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub push: PushSection,

    #[serde(default)]
    pub sync: SyncSection,

    #[serde(default)]
    pub log: LogSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiSection {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Overrides the stored API base for dashboard views.
    pub base_url: Option<String>,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            base_url: None,
        }
    }
}

/// First-install poll settings, in TOML-friendly snake_case.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub location: String,
    pub min_salary: Option<u64>,
    pub max_salary: Option<u64>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self::from(&PollSettings::default())
    }
}

impl From<&PollSettings> for Defaults {
    fn from(s: &PollSettings) -> Self {
        Self {
            api_base: s.api_base.clone(),
            title: s.title.clone(),
            location: s.location.clone(),
            min_salary: s.min_salary,
            max_salary: s.max_salary,
            limit: s.limit,
            interval_seconds: s.interval_seconds,
            enabled: s.enabled,
        }
    }
}

impl Defaults {
    pub fn to_settings(&self) -> PollSettings {
        PollSettings {
            api_base: self.api_base.clone(),
            title: self.title.clone(),
            location: self.location.clone(),
            min_salary: self.min_salary,
            max_salary: self.max_salary,
            limit: self.limit,
            interval_seconds: self.interval_seconds,
            enabled: self.enabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PushSection {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_area")]
    pub area: u32,
    #[serde(default)]
    pub only_with_salary: bool,
}

impl Default for PushSection {
    fn default() -> Self {
        Self {
            enabled: true,
            area: default_area(),
            only_with_salary: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SyncSection {
    #[serde(default = "default_sync")]
    pub interval_secs: u64,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            interval_secs: default_sync(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogSection {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file for the TUI and daemon (stderr is used otherwise).
    pub file: Option<PathBuf>,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_api_base() -> String {
    PollSettings::default().api_base
}
fn default_title() -> String {
    PollSettings::default().title
}
fn default_limit() -> u32 {
    PollSettings::default().limit
}
fn default_interval() -> u64 {
    PollSettings::default().interval_seconds
}
fn default_true() -> bool {
    true
}
fn default_area() -> u32 {
    1
}
fn default_sync() -> u64 {
    2
}
fn default_log_level() -> String {
    "info".into()
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "vacwatch", "vacwatch")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory for the state file and logs.
pub fn data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".local/share"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

fn dirs_fallback(base: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(base);
    p.push("vacwatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load from an explicit file + environment. A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?;
    config.validate()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parent dirs.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Reject values nothing downstream could use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Validation {
                field: "api.timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.sync.interval_secs == 0 {
            return Err(ConfigError::Validation {
                field: "sync.interval_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if let Some(ref base) = self.api.base_url {
            url::Url::parse(base).map_err(|e| ConfigError::Validation {
                field: "api.base_url".into(),
                reason: format!("invalid URL '{base}': {e}"),
            })?;
        }
        Ok(())
    }

    /// State file path, defaulting to `state.json` in the data dir.
    pub fn state_file_path(&self) -> PathBuf {
        self.state_file
            .clone()
            .unwrap_or_else(|| data_dir().join("state.json"))
    }

    pub fn to_transport(&self) -> TransportConfig {
        TransportConfig::with_timeout(Duration::from_secs(self.api.timeout_secs))
    }

    pub fn push_options(&self) -> PushOptions {
        PushOptions {
            enabled: self.push.enabled,
            area: self.push.area,
            only_with_salary: self.push.only_with_salary,
        }
    }

    /// Build a `WatcherConfig`, no CLI flag overrides.
    pub fn to_watcher_config(&self) -> WatcherConfig {
        WatcherConfig {
            transport: self.to_transport(),
            defaults: self.defaults.to_settings(),
            push: self.push_options(),
            sync_interval: Duration::from_secs(self.sync.interval_secs),
        }
    }
}
