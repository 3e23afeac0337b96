//! All UI actions. Actions are the only way state changes.

use std::sync::Arc;

use vacwatch_core::{
    Badge, DashboardStats, PollOutcome, PollSettings, Record, References, SaveReport, Vacancy,
    VacancyAlert, VacancyQuery, VacancySummary, ViewState,
};

use crate::screen::ScreenId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A toast.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Warning,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    GoBack,
    ToggleHelp,

    // ── Dashboard fetches ─────────────────────────────────────────
    LoadOverview,
    OverviewLoaded(ViewState<Arc<DashboardStats>>),
    LoadReferences,
    ReferencesLoaded(ViewState<Arc<References>>),
    LoadVacancies(Box<VacancyQuery>),
    VacanciesLoaded(ViewState<Arc<Vec<VacancySummary>>>),
    /// Jump to the detail screen for a listed vacancy.
    OpenVacancy(i64),
    LoadVacancy(i64),
    VacancyLoaded(ViewState<Arc<Vacancy>>),

    // ── Watcher ───────────────────────────────────────────────────
    RecordUpdated(Arc<Record>),
    BadgeUpdated(Badge),
    Alert(VacancyAlert),
    PollNow,
    PollFinished(PollOutcome),
    SaveSettings(Box<PollSettings>),
    SettingsSaved(Result<SaveReport, String>),

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
}
