//! Application core: event loop, screen management, action dispatch.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Tabs},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use vacwatch_core::{
    Badge, ChannelNotifier, CoreError, Dashboard, HttpClient, PollOutcome, PushResult,
    VacancyQuery, ViewState, Watcher,
};

use crate::action::{Action, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;
use crate::widgets::form;

/// Below this width the status bar drops the API base.
const NARROW_WIDTH: u16 = 90;
const TOAST_TTL: Duration = Duration::from_secs(3);

/// Top-level application state and event loop.
pub struct App {
    /// Current active screen.
    active_screen: ScreenId,
    /// Previous screen for GoBack.
    previous_screen: Option<ScreenId>,
    /// All screen components, keyed by ScreenId.
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    help_visible: bool,
    /// Terminal size for responsive layout.
    terminal_size: (u16, u16),
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    watcher: Watcher,
    notifier: Arc<ChannelNotifier>,
    /// Shared pool for dashboard requests.
    http: HttpClient,
    /// `--api-base`; wins over the stored base for dashboard views.
    api_base_override: Option<String>,
    /// Base the dashboard talks to, refreshed from each record update.
    api_base: String,
    polling_status: Option<String>,
    badge: Badge,
    /// Cancellation token for the data bridge task.
    data_cancel: CancellationToken,
    /// Active notification toast with display timestamp.
    notification: Option<(Notification, Instant)>,
    /// Generation counters: a response whose generation is no longer
    /// current belongs to a superseded request and is dropped.
    listing_generation: Arc<AtomicU64>,
    detail_generation: Arc<AtomicU64>,
}

impl App {
    pub fn new(
        watcher: Watcher,
        notifier: Arc<ChannelNotifier>,
        http: HttpClient,
        api_base_override: Option<String>,
    ) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let screens: HashMap<ScreenId, Box<dyn Component>> =
            create_screens().into_iter().collect();

        let record = watcher.snapshot();
        let api_base = api_base_override
            .clone()
            .unwrap_or_else(|| record.settings.api_base.clone());

        Self {
            active_screen: ScreenId::default(),
            previous_screen: None,
            screens,
            running: true,
            help_visible: false,
            terminal_size: (0, 0),
            action_tx,
            action_rx,
            watcher,
            notifier,
            http,
            api_base_override,
            api_base,
            polling_status: record.state.polling_status,
            badge: Badge::Cleared,
            data_cancel: CancellationToken::new(),
            notification: None,
            listing_generation: Arc::new(AtomicU64::new(0)),
            detail_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Initialize all screen components with the action sender.
    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
        Ok(())
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.terminal_size = tui.size().unwrap_or((80, 24));
        self.init_screens()?;
        self.action_tx.send(Action::LoadOverview)?;

        {
            let watcher = self.watcher.clone();
            let notifier = Arc::clone(&self.notifier);
            let cancel = self.data_cancel.clone();
            let tx = self.action_tx.clone();
            tokio::spawn(async move {
                crate::data_bridge::spawn_data_bridge(watcher, notifier, tx, cancel).await;
            });
        }

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!(api_base = %self.api_base, "TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        events.stop();
        tui.exit();
        self.watcher.shutdown().await;
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here;
    /// screen-specific keys are delegated to the active screen component.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
                _ => Ok(None),
            };
        }

        // A screen with an open form gets every key.
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            if screen.captures_input() {
                return screen.handle_key_event(key);
            }
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),

            (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='4')) => {
                let n = u8::try_from(c).map_or(0, |b| b - b'0');
                if let Some(screen) = ScreenId::from_number(n) {
                    return Ok(Some(Action::SwitchScreen(screen)));
                }
            }

            (KeyModifiers::NONE, KeyCode::Tab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.next())));
            }
            (KeyModifiers::SHIFT, KeyCode::BackTab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.prev())));
            }

            (KeyModifiers::NONE, KeyCode::Esc) => return Ok(Some(Action::GoBack)),

            _ => {}
        }

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_key_event(key);
        }
        Ok(None)
    }

    fn switch_to(&mut self, target: ScreenId) {
        if target == self.active_screen {
            return;
        }
        debug!("switching screen: {} → {}", self.active_screen, target);
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(false);
        }
        self.previous_screen = Some(self.active_screen);
        self.active_screen = target;
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
    }

    /// Process a single action: update app state, then let every screen
    /// see it. Screens ignore what they do not care about.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
                return Ok(());
            }
            Action::Render => return Ok(()),
            Action::Resize(w, h) => {
                self.terminal_size = (*w, *h);
                return Ok(());
            }
            Action::SwitchScreen(target) => {
                self.switch_to(*target);
                return Ok(());
            }
            Action::GoBack => {
                if let Some(prev) = self.previous_screen.take() {
                    self.action_tx.send(Action::SwitchScreen(prev))?;
                }
                return Ok(());
            }
            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
                return Ok(());
            }
            Action::Notify(n) => {
                self.notification = Some((n.clone(), Instant::now()));
                return Ok(());
            }

            Action::Tick => {
                if let Some((_, created)) = &self.notification {
                    if created.elapsed() > TOAST_TTL {
                        self.notification = None;
                    }
                }
            }

            // ── Dashboard fetches ─────────────────────────────────────
            Action::LoadOverview => self.fetch_overview(),
            Action::LoadReferences => self.fetch_references(),
            Action::LoadVacancies(query) => self.fetch_vacancies(query.as_ref().clone()),
            Action::LoadVacancy(id) => self.fetch_vacancy(*id),
            Action::OpenVacancy(_) => self.switch_to(ScreenId::Detail),

            // ── Watcher ───────────────────────────────────────────────
            Action::RecordUpdated(record) => {
                self.polling_status.clone_from(&record.state.polling_status);
                if self.api_base_override.is_none() && record.settings.api_base != self.api_base {
                    info!(api_base = %record.settings.api_base, "API base changed, reloading");
                    self.api_base.clone_from(&record.settings.api_base);
                    self.action_tx.send(Action::LoadOverview)?;
                    self.action_tx.send(Action::LoadReferences)?;
                }
            }
            Action::BadgeUpdated(badge) => self.badge = badge.clone(),
            Action::Alert(alert) => {
                self.action_tx
                    .send(Action::Notify(Notification::success(alert.message.clone())))?;
            }
            Action::PollNow => self.spawn_poll(),
            Action::PollFinished(outcome) => {
                if let Some(n) = poll_notification(outcome) {
                    self.action_tx.send(Action::Notify(n))?;
                }
            }
            Action::SaveSettings(settings) => self.spawn_save(settings.as_ref().clone()),
            Action::SettingsSaved(result) => {
                let n = match result {
                    Ok(report) => match &report.push {
                        PushResult::Failed { message } => Notification::warning(format!(
                            "Saved locally; push failed: {message}"
                        )),
                        PushResult::Sent | PushResult::Disabled => Notification::success(format!(
                            "Settings saved, polling every {} sec",
                            report.interval_secs
                        )),
                    },
                    Err(message) => Notification::error(format!("Save failed: {message}")),
                };
                self.action_tx.send(Action::Notify(n))?;
            }

            Action::OverviewLoaded(_)
            | Action::ReferencesLoaded(_)
            | Action::VacanciesLoaded(_)
            | Action::VacancyLoaded(_) => {}
        }

        for screen in self.screens.values_mut() {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    // ── Background work ───────────────────────────────────────────

    /// Dashboard for the current base. Built per request so a base change
    /// from the Watch screen applies to the next fetch.
    fn dashboard(&self) -> Result<Dashboard, CoreError> {
        Dashboard::with_http(self.http.clone(), &self.api_base)
    }

    /// Run `fetch` against the dashboard and send its mapped result. When
    /// `generation` is given, the result is dropped if a newer request of
    /// the same kind was issued meanwhile.
    fn spawn_fetch<T, Fut>(
        &self,
        generation: Option<(Arc<AtomicU64>, u64)>,
        fetch: impl FnOnce(Dashboard) -> Fut + Send + 'static,
        wrap: impl FnOnce(ViewState<T>) -> Action + Send + 'static,
    ) where
        T: Send + 'static,
        Fut: Future<Output = ViewState<T>> + Send + 'static,
    {
        let tx = self.action_tx.clone();
        let dashboard = self.dashboard();
        tokio::spawn(async move {
            let state = match dashboard {
                Ok(dashboard) => fetch(dashboard).await,
                Err(e) => ViewState::from_error(&e),
            };
            if let Some((counter, issued)) = generation {
                if counter.load(Ordering::Relaxed) != issued {
                    debug!("dropping stale response");
                    return;
                }
            }
            if let ViewState::Failed(message) = &state {
                warn!(error = %message, "dashboard request failed");
            }
            let _ = tx.send(wrap(state));
        });
    }

    fn fetch_overview(&self) {
        self.spawn_fetch(
            None,
            |dashboard| async move {
                ViewState::from_result(dashboard.overview().await).map(Arc::new)
            },
            Action::OverviewLoaded,
        );
    }

    fn fetch_references(&self) {
        self.spawn_fetch(
            None,
            |dashboard| async move {
                ViewState::from_result(dashboard.references().await).map(Arc::new)
            },
            Action::ReferencesLoaded,
        );
    }

    fn fetch_vacancies(&self, query: VacancyQuery) {
        let issued = self.listing_generation.fetch_add(1, Ordering::Relaxed) + 1;
        self.spawn_fetch(
            Some((Arc::clone(&self.listing_generation), issued)),
            move |dashboard| async move {
                ViewState::from_list(dashboard.vacancies(&query).await).map(Arc::new)
            },
            Action::VacanciesLoaded,
        );
    }

    fn fetch_vacancy(&self, id: i64) {
        let issued = self.detail_generation.fetch_add(1, Ordering::Relaxed) + 1;
        self.spawn_fetch(
            Some((Arc::clone(&self.detail_generation), issued)),
            move |dashboard| async move {
                ViewState::from_result(dashboard.vacancy(&id.to_string()).await).map(Arc::new)
            },
            Action::VacancyLoaded,
        );
    }

    fn spawn_poll(&self) {
        let watcher = self.watcher.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let outcome = watcher.poll_now().await;
            let _ = tx.send(Action::PollFinished(outcome));
        });
    }

    fn spawn_save(&self, settings: vacwatch_core::PollSettings) {
        let watcher = self.watcher.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result = watcher
                .save_settings(settings)
                .await
                .map_err(|e| e.to_string());
            if let Err(message) = &result {
                warn!(error = %message, "saving settings failed");
            }
            let _ = tx.send(Action::SettingsSaved(result));
        });
    }

    // ── Rendering ─────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::vertical([
            Constraint::Min(1),    // Screen content
            Constraint::Length(1), // Tab bar
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, layout[0]);
        }
        self.render_tab_bar(frame, layout[1]);
        self.render_status_bar(frame, layout[2]);

        if let Some((ref notif, _)) = self.notification {
            Self::render_notification(frame, area, notif);
        }
        if self.help_visible {
            Self::render_help_overlay(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(
                    format!(" {} {} ", id.number(), id.label()),
                    style,
                ))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(
                ScreenId::ALL
                    .iter()
                    .position(|&s| s == self.active_screen)
                    .unwrap_or(0),
            );
        frame.render_widget(tabs, area);
    }

    /// App name with the new-vacancy badge, polling status, API base.
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(" vacwatch ", theme::title_style())];

        let badge = self.badge.text();
        if !badge.is_empty() {
            spans.push(Span::styled(format!(" {badge} "), theme::badge()));
            spans.push(Span::raw(" "));
        }

        let status = self.polling_status.as_deref().unwrap_or("Polling: starting");
        let status_style = if status.contains("error") {
            theme::error()
        } else if status.contains("disabled") {
            theme::disabled()
        } else {
            Style::default().fg(theme::GREEN)
        };
        spans.push(Span::styled(format!("\u{2502} {status} "), status_style));

        if self.terminal_size.0 >= NARROW_WIDTH {
            spans.push(Span::styled(format!("\u{2502} {} ", self.api_base), theme::key_hint()));
        }
        spans.push(Span::styled("\u{2502} ? help  q quit", theme::key_hint()));

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_help_overlay(frame: &mut Frame, area: Rect) {
        let inner = form::centered_panel(frame, area, "Keyboard Shortcuts", 62, 24);

        let section = |title: &'static str| {
            Line::from(Span::styled(
                format!("  {title}"),
                Style::default().fg(theme::CYAN),
            ))
        };
        let key = |keys: &'static str, what: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {keys:<12}"), theme::key_hint_key()),
                Span::styled(what, theme::key_hint()),
            ])
        };

        let help_text = vec![
            section("Global"),
            key("1-4 Tab", "Switch screen"),
            key("Esc", "Back / close"),
            key("? q", "This help / quit"),
            Line::from(""),
            section("Overview"),
            key("r", "Refresh statistics"),
            Line::from(""),
            section("Vacancies"),
            key("j/k Enter", "Move / open detail"),
            key("n p", "Next / previous page"),
            key("f", "Edit filters (Enter applies)"),
            key("c", "Clear filters"),
            Line::from(""),
            section("Detail"),
            key("/", "Type a vacancy id"),
            key("h/l j/k", "Section / scroll"),
            Line::from(""),
            section("Watch"),
            key("e", "Edit settings (Enter saves)"),
            key("p", "Poll now"),
            Line::from(""),
            Line::from(Span::styled(
                "                         Esc or ? to close",
                theme::key_hint(),
            )),
        ];
        frame.render_widget(Paragraph::new(help_text), inner);
    }

    /// Toast in the bottom-right corner, above the status bar.
    fn render_notification(frame: &mut Frame, area: Rect, notif: &Notification) {
        let msg_len = u16::try_from(notif.message.chars().count()).unwrap_or(u16::MAX);
        let width = msg_len
            .saturating_add(6)
            .clamp(20, 60)
            .min(area.width.saturating_sub(2));
        let height = 3u16;

        let x = area.width.saturating_sub(width + 1);
        let y = area.height.saturating_sub(height + 2);
        let toast_area = Rect::new(area.x + x, area.y + y, width, height);

        let (border_color, icon) = match notif.level {
            NotificationLevel::Success => (theme::GREEN, "\u{2713}"),
            NotificationLevel::Error => (theme::RED, "\u{2717}"),
            NotificationLevel::Warning => (theme::AMBER, "!"),
            NotificationLevel::Info => (theme::CYAN, "\u{00B7}"),
        };

        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            toast_area,
        );
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color));
        let inner = block.inner(toast_area);
        frame.render_widget(block, toast_area);

        let line = Line::from(vec![
            Span::styled(format!(" {icon} "), Style::default().fg(border_color)),
            Span::styled(notif.message.as_str(), Style::default().fg(theme::TEXT)),
        ]);
        frame.render_widget(Paragraph::new(line), inner);
    }
}

/// Toast for a finished poll. Growth is reported by the alert instead.
fn poll_notification(outcome: &PollOutcome) -> Option<Notification> {
    match outcome {
        PollOutcome::Skipped => Some(Notification::info("Polling is disabled")),
        PollOutcome::Checked { delta: Some(_), .. } => None,
        PollOutcome::Checked { count, .. } => {
            Some(Notification::info(format!("No new vacancies ({count} total)")))
        }
        PollOutcome::Failed { message } => Some(Notification::error(message.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_is_left_to_the_alert() {
        let grown = PollOutcome::Checked {
            count: 15,
            previous: 10,
            delta: Some(5),
        };
        assert!(poll_notification(&grown).is_none());

        let flat = PollOutcome::Checked {
            count: 10,
            previous: 10,
            delta: None,
        };
        let n = poll_notification(&flat).expect("toast");
        assert_eq!(n.message, "No new vacancies (10 total)");
        assert_eq!(n.level, NotificationLevel::Info);
    }

    #[test]
    fn failures_surface_as_errors() {
        let n = poll_notification(&PollOutcome::Failed {
            message: "API error: 500".into(),
        })
        .expect("toast");
        assert_eq!(n.level, NotificationLevel::Error);
        assert_eq!(n.message, "API error: 500");
    }
}
