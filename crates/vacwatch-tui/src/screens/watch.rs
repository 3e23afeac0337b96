//! Watch screen: poll settings form and live poll status.
//!
//! The form mirrors the stored record until `e` starts an edit; while
//! editing, record updates only refresh the status panel.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use throbber_widgets_tui::{Throbber, ThrobberState};
use vacwatch_core::{Badge, PollSettings, Record, format_timestamp};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::form;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Viewing,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatchField {
    ApiBase,
    Title,
    Location,
    MinSalary,
    MaxSalary,
    Limit,
    Interval,
    Enabled,
}

impl WatchField {
    const ALL: [WatchField; 8] = [
        Self::ApiBase,
        Self::Title,
        Self::Location,
        Self::MinSalary,
        Self::MaxSalary,
        Self::Limit,
        Self::Interval,
        Self::Enabled,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::ApiBase => "API base URL",
            Self::Title => "Title",
            Self::Location => "Location",
            Self::MinSalary => "Salary from",
            Self::MaxSalary => "Salary to",
            Self::Limit => "Limit",
            Self::Interval => "Interval (seconds)",
            Self::Enabled => "Polling enabled",
        }
    }
}

/// Editable text copy of [`PollSettings`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Draft {
    api_base: String,
    title: String,
    location: String,
    min_salary: String,
    max_salary: String,
    limit: String,
    interval: String,
    enabled: bool,
}

impl Draft {
    fn from_settings(settings: &PollSettings) -> Self {
        let opt = |v: Option<u64>| v.map(|n| n.to_string()).unwrap_or_default();
        Self {
            api_base: settings.api_base.clone(),
            title: settings.title.clone(),
            location: settings.location.clone(),
            min_salary: opt(settings.min_salary),
            max_salary: opt(settings.max_salary),
            limit: settings.limit.to_string(),
            interval: settings.interval_seconds.to_string(),
            enabled: settings.enabled,
        }
    }

    fn text_mut(&mut self, field: WatchField) -> Option<&mut String> {
        match field {
            WatchField::ApiBase => Some(&mut self.api_base),
            WatchField::Title => Some(&mut self.title),
            WatchField::Location => Some(&mut self.location),
            WatchField::MinSalary => Some(&mut self.min_salary),
            WatchField::MaxSalary => Some(&mut self.max_salary),
            WatchField::Limit => Some(&mut self.limit),
            WatchField::Interval => Some(&mut self.interval),
            WatchField::Enabled => None,
        }
    }

    fn text(&self, field: WatchField) -> &str {
        match field {
            WatchField::ApiBase => &self.api_base,
            WatchField::Title => &self.title,
            WatchField::Location => &self.location,
            WatchField::MinSalary => &self.min_salary,
            WatchField::MaxSalary => &self.max_salary,
            WatchField::Limit => &self.limit,
            WatchField::Interval => &self.interval,
            WatchField::Enabled => "",
        }
    }

    /// Parse and validate into settings ready to save.
    fn to_settings(&self) -> Result<PollSettings, String> {
        fn optional(raw: &str, what: &str) -> Result<Option<u64>, String> {
            let raw = raw.trim();
            if raw.is_empty() {
                return Ok(None);
            }
            raw.parse()
                .map(Some)
                .map_err(|_| format!("{what} must be a whole number"))
        }

        let settings = PollSettings {
            api_base: self.api_base.clone(),
            title: self.title.clone(),
            location: self.location.clone(),
            min_salary: optional(&self.min_salary, "minimum salary")?,
            max_salary: optional(&self.max_salary, "maximum salary")?,
            limit: self
                .limit
                .trim()
                .parse()
                .map_err(|_| "limit must be a whole number".to_owned())?,
            interval_seconds: self
                .interval
                .trim()
                .parse()
                .map_err(|_| "interval must be a whole number of seconds".to_owned())?,
            enabled: self.enabled,
        }
        .normalized();
        settings.validate().map_err(|e| e.to_string())?;
        Ok(settings)
    }
}

pub struct WatchScreen {
    focused: bool,
    mode: Mode,
    field: WatchField,
    draft: Draft,
    record: Option<Arc<Record>>,
    badge: Badge,
    form_error: Option<String>,
    polling: bool,
    saving: bool,
    throbber: ThrobberState,
}

impl WatchScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            mode: Mode::Viewing,
            field: WatchField::ApiBase,
            draft: Draft::default(),
            record: None,
            badge: Badge::Cleared,
            form_error: None,
            polling: false,
            saving: false,
            throbber: ThrobberState::default(),
        }
    }

    fn revert(&mut self) {
        if let Some(record) = &self.record {
            self.draft = Draft::from_settings(&record.settings);
        }
        self.form_error = None;
    }

    fn focus_next(&mut self) {
        let pos = WatchField::ALL.iter().position(|&f| f == self.field).unwrap_or(0);
        self.field = WatchField::ALL[(pos + 1) % WatchField::ALL.len()];
    }

    fn focus_prev(&mut self) {
        let len = WatchField::ALL.len();
        let pos = WatchField::ALL.iter().position(|&f| f == self.field).unwrap_or(0);
        self.field = WatchField::ALL[(pos + len - 1) % len];
    }

    fn handle_editing_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => {
                self.revert();
                self.mode = Mode::Viewing;
            }
            KeyCode::Enter => {
                if self.saving {
                    return None;
                }
                match self.draft.to_settings() {
                    Ok(settings) => {
                        self.form_error = None;
                        return Some(Action::SaveSettings(Box::new(settings)));
                    }
                    Err(message) => self.form_error = Some(message),
                }
            }
            KeyCode::Tab | KeyCode::Down => self.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.focus_prev(),
            KeyCode::Char(' ') if self.field == WatchField::Enabled => {
                self.draft.enabled = !self.draft.enabled;
            }
            KeyCode::Backspace => {
                if let Some(text) = self.draft.text_mut(self.field) {
                    text.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(text) = self.draft.text_mut(self.field) {
                    text.push(c);
                }
            }
            _ => {}
        }
        None
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn is_active(&self, field: WatchField) -> bool {
        self.mode == Mode::Editing && self.field == field
    }

    fn text_field(&self, frame: &mut Frame, area: Rect, field: WatchField) {
        let value = self.draft.text(field);
        form::input_field(frame, area, field.label(), value, self.is_active(field));
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let editing = self.mode == Mode::Editing;
        let block = Block::default()
            .title(Span::styled(" Settings ", theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if editing {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::vertical([
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(inner);

        self.text_field(frame, rows[0], WatchField::ApiBase);
        let pairs = [
            (WatchField::Title, WatchField::Location),
            (WatchField::MinSalary, WatchField::MaxSalary),
            (WatchField::Limit, WatchField::Interval),
        ];
        for (row, (left, right)) in rows[1..4].iter().zip(pairs) {
            let cols = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .spacing(1)
                .split(*row);
            self.text_field(frame, cols[0], left);
            self.text_field(frame, cols[1], right);
        }
        form::toggle(
            frame,
            rows[4],
            WatchField::Enabled.label(),
            self.draft.enabled,
            self.is_active(WatchField::Enabled),
        );

        let footer = if self.saving {
            Line::from(Span::styled(" Saving\u{2026}", Style::default().fg(theme::CYAN)))
        } else if let Some(message) = &self.form_error {
            Line::from(vec![
                Span::styled(" ! ", Style::default().fg(theme::AMBER)),
                Span::styled(message.as_str(), Style::default().fg(theme::AMBER)),
            ])
        } else if editing {
            Line::from(Span::styled(
                " Tab next  Space toggle  Enter save  Esc cancel",
                theme::key_hint(),
            ))
        } else {
            Line::from(vec![
                Span::styled(" e ", theme::key_hint_key()),
                Span::styled("edit  ", theme::key_hint()),
                Span::styled("p ", theme::key_hint_key()),
                Span::styled("poll now", theme::key_hint()),
            ])
        };
        frame.render_widget(
            Paragraph::new(footer).wrap(Wrap { trim: true }),
            rows[5],
        );
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(Span::styled(" Status ", theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);

        let row = |key: &str, value: String, style: Style| {
            Line::from(vec![
                Span::styled(format!("  {key:<14}"), theme::key_hint()),
                Span::styled(value, style),
            ])
        };
        let text = theme::table_row();

        let lines = match &self.record {
            None => vec![Line::from(Span::styled("  No record yet", theme::key_hint()))],
            Some(record) => {
                let state = &record.state;
                let settings = &record.settings;
                let mut lines = vec![
                    row(
                        "Last checked",
                        state
                            .last_checked
                            .as_ref()
                            .map_or_else(|| "never".to_owned(), format_timestamp),
                        text,
                    ),
                    row(
                        "Last count",
                        state
                            .last_count
                            .map_or_else(|| "-".to_owned(), |n| n.to_string()),
                        Style::default()
                            .fg(theme::CYAN)
                            .add_modifier(Modifier::BOLD),
                    ),
                    row(
                        "Every",
                        humantime::format_duration(settings.effective_interval()).to_string(),
                        text,
                    ),
                    row(
                        "Status",
                        state.polling_status.clone().unwrap_or_else(|| "-".to_owned()),
                        if settings.enabled {
                            Style::default().fg(theme::GREEN)
                        } else {
                            theme::disabled()
                        },
                    ),
                ];
                let badge = self.badge.text();
                if !badge.is_empty() {
                    lines.push(row("New", format!(" {badge} "), theme::badge()));
                }
                if let Some(error) = &state.last_error {
                    lines.push(Line::from(""));
                    lines.push(row("Last error", error.clone(), theme::error()));
                }
                lines
            }
        };
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), layout[0]);

        if self.polling || self.saving {
            let label = if self.polling { " Polling\u{2026}" } else { " Saving\u{2026}" };
            let throbber = Throbber::default()
                .label(label)
                .style(Style::default().fg(theme::CYAN))
                .throbber_style(Style::default().fg(theme::ACCENT));
            frame.render_stateful_widget(throbber, layout[1], &mut self.throbber.clone());
        }
    }
}

impl Component for WatchScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.mode == Mode::Editing {
            return Ok(self.handle_editing_key(key));
        }
        let action = match key.code {
            KeyCode::Char('e') | KeyCode::Enter => {
                self.revert();
                self.mode = Mode::Editing;
                None
            }
            KeyCode::Char('p') if !self.polling => Some(Action::PollNow),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::RecordUpdated(record) => {
                self.record = Some(Arc::clone(record));
                if self.mode == Mode::Viewing {
                    self.draft = Draft::from_settings(&record.settings);
                }
            }
            Action::BadgeUpdated(badge) => self.badge = badge.clone(),
            Action::PollNow => self.polling = true,
            Action::PollFinished(_) => self.polling = false,
            Action::SaveSettings(_) => self.saving = true,
            Action::SettingsSaved(result) => {
                self.saving = false;
                match result {
                    Ok(_) => {
                        self.mode = Mode::Viewing;
                        self.form_error = None;
                        if let Some(record) = &self.record {
                            self.draft = Draft::from_settings(&record.settings);
                        }
                    }
                    Err(message) => self.form_error = Some(message.clone()),
                }
            }
            Action::Tick if self.polling || self.saving => self.throbber.calc_next(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(Span::styled(" Watch ", theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let cols = Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(inner);
        self.render_form(frame, cols[0]);
        self.render_status(frame, cols[1]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn captures_input(&self) -> bool {
        self.mode == Mode::Editing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;
    use vacwatch_core::PollState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn record(title: &str) -> Arc<Record> {
        Arc::new(Record {
            settings: PollSettings {
                title: title.into(),
                ..PollSettings::default()
            },
            state: PollState::default(),
        })
    }

    #[test]
    fn draft_parses_blank_salaries_as_none() {
        let draft = Draft::from_settings(&PollSettings::default());
        let settings = draft.to_settings().expect("defaults are valid");
        assert_eq!(settings, PollSettings::default());
    }

    #[test]
    fn draft_rejects_non_numeric_and_out_of_range_values() {
        let mut draft = Draft::from_settings(&PollSettings::default());
        draft.limit = "lots".into();
        assert_eq!(
            draft.to_settings().expect_err("bad limit"),
            "limit must be a whole number"
        );

        draft.limit = "0".into();
        assert!(draft.to_settings().is_err());

        draft.limit = "20".into();
        draft.min_salary = "500".into();
        draft.max_salary = "100".into();
        assert!(draft.to_settings().is_err());
    }

    #[test]
    fn edits_survive_record_updates_until_cancelled() {
        let mut screen = WatchScreen::new();
        screen.update(&Action::RecordUpdated(record("python"))).expect("update");
        assert_eq!(screen.draft.title, "python");

        screen.handle_key_event(key(KeyCode::Char('e'))).expect("key");
        assert!(screen.captures_input());
        screen.handle_key_event(key(KeyCode::Tab)).expect("key");
        for _ in 0.."python".len() {
            screen.handle_key_event(key(KeyCode::Backspace)).expect("key");
        }
        for c in "rust".chars() {
            screen.handle_key_event(key(KeyCode::Char(c))).expect("key");
        }

        screen.update(&Action::RecordUpdated(record("golang"))).expect("update");
        assert_eq!(screen.draft.title, "rust");

        screen.handle_key_event(key(KeyCode::Esc)).expect("key");
        assert_eq!(screen.draft.title, "golang");
        assert!(!screen.captures_input());
    }

    #[test]
    fn submit_sends_validated_settings() {
        let mut screen = WatchScreen::new();
        screen.update(&Action::RecordUpdated(record("python"))).expect("update");
        screen.handle_key_event(key(KeyCode::Char('e'))).expect("key");
        let action = screen.handle_key_event(key(KeyCode::Enter)).expect("key");
        assert!(matches!(action, Some(Action::SaveSettings(ref s)) if s.title == "python"));

        screen.update(&Action::SaveSettings(Box::default())).expect("update");
        assert!(screen.saving);
        screen
            .update(&Action::SettingsSaved(Err("storage failed".into())))
            .expect("update");
        assert!(!screen.saving);
        assert!(screen.captures_input());
        assert_eq!(screen.form_error.as_deref(), Some("storage failed"));
    }
}
