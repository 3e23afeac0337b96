//! Polling, storage and dashboard logic between `vacwatch-api` and the
//! user-facing surfaces (CLI / TUI).
//!
//! - **[`Watcher`]** is the facade that owns the lifecycle:
//!   [`start()`](Watcher::start) installs defaults, arms the poll timer and
//!   polls once; [`save_settings()`](Watcher::save_settings) persists,
//!   re-arms, polls and pushes the filters to the API.
//!
//! - **[`Poller`]** runs a single count check against the stored settings
//!   and turns the result into an alert, a badge update and new poll state.
//!
//! - **[`SettingsStore`]** is the storage port. [`FileStore`] persists a
//!   single JSON record; [`MemoryStore`] backs tests and ephemeral runs.
//!   Both publish changes on a `tokio::sync::watch` channel.
//!
//! - **[`Notifier`]** receives alerts and badge changes. Surfaces plug in
//!   their own sink next to [`LogNotifier`] and [`ChannelNotifier`].
//!
//! - **[`dashboard`]** holds the read-only views: overview statistics,
//!   the filtered listing and vacancy detail.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod notify;
pub mod poller;
pub mod scheduler;
pub mod store;
pub mod watcher;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DEFAULT_SYNC_INTERVAL, WatcherConfig};
pub use dashboard::{Dashboard, FilterForm, Listing, PAGE_SIZE, References, ViewState};
pub use error::CoreError;
pub use model::{
    MIN_INTERVAL_SECS, PollSettings, PollState, PollStatus, PushOptions, Record, format_timestamp,
};
pub use notify::{
    BADGE_COLOR, Badge, ChannelNotifier, FanoutNotifier, LogNotifier, Notifier, NotifierEvent,
    VacancyAlert,
};
pub use poller::{Clock, FixedClock, PollOutcome, Poller, SystemClock};
pub use scheduler::Scheduler;
pub use store::{FileStore, MemoryStore, RefreshOutcome, SettingsStore, StorageError};
pub use watcher::{POLL_TIMER_ID, PushResult, SaveReport, Watcher};

// API types surfaces render directly.
pub use vacwatch_api::{
    Company, CountQuery, DashboardStats, Experience, ExperienceBucket, HttpClient, Overview,
    SalarySummary, Skill, SkillCount, SkillRef, TransportConfig, Vacancy, VacancyQuery,
    VacancySummary, WorkFormat, WorkSchedule,
};
