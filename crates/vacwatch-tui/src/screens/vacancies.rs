//! Vacancies screen: filter form, paged table, skill toggles.
//!
//! Editing the form never fetches. `Enter` applies the form and reloads
//! from the first page; `c` clears both form and applied filters.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};
use throbber_widgets_tui::ThrobberState;
use tokio::sync::mpsc::UnboundedSender;
use vacwatch_core::dashboard::format_salary;
use vacwatch_core::{Listing, References, VacancySummary, ViewState};

use crate::action::{Action, Notification};
use crate::component::Component;
use crate::theme;
use crate::widgets::{bars, form, sub_tabs, view_state};

const FILTER_PANEL_WIDTH: u16 = 38;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Filter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterField {
    Title,
    Location,
    MinSalary,
    MaxSalary,
    Experience,
    WorkFormat,
    WorkSchedule,
    ActiveOnly,
    Skills,
}

impl FilterField {
    const ALL: [FilterField; 9] = [
        Self::Title,
        Self::Location,
        Self::MinSalary,
        Self::MaxSalary,
        Self::Experience,
        Self::WorkFormat,
        Self::WorkSchedule,
        Self::ActiveOnly,
        Self::Skills,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Location => "Location",
            Self::MinSalary => "Salary from",
            Self::MaxSalary => "Salary to",
            Self::Experience => "Experience",
            Self::WorkFormat => "Format",
            Self::WorkSchedule => "Schedule",
            Self::ActiveOnly => "Active only",
            Self::Skills => "Skills",
        }
    }
}

/// Step through `None, ids[0], .., ids[n-1]` and wrap.
fn cycle_option(current: Option<i64>, ids: &[i64], forward: bool) -> Option<i64> {
    let len = ids.len() + 1;
    let pos = current
        .and_then(|c| ids.iter().position(|&id| id == c))
        .map_or(0, |p| p + 1);
    let next = if forward {
        (pos + 1) % len
    } else {
        (pos + len - 1) % len
    };
    next.checked_sub(1).and_then(|i| ids.get(i).copied())
}

pub struct VacanciesScreen {
    focused: bool,
    action_tx: Option<UnboundedSender<Action>>,
    listing: Listing,
    rows: ViewState<Arc<Vec<VacancySummary>>>,
    refs: ViewState<Arc<References>>,
    table_state: TableState,
    mode: Mode,
    field: FilterField,
    skill_cursor: usize,
    throbber: ThrobberState,
}

impl VacanciesScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            action_tx: None,
            listing: Listing::new(),
            rows: ViewState::Loading,
            refs: ViewState::Loading,
            table_state: TableState::default(),
            mode: Mode::Browse,
            field: FilterField::Title,
            skill_cursor: 0,
            throbber: ThrobberState::default(),
        }
    }

    fn load(&self) -> Action {
        Action::LoadVacancies(Box::new(self.listing.query()))
    }

    fn last_len(&self) -> usize {
        self.rows.ready().map_or(0, |rows| rows.len())
    }

    fn selected(&self) -> Option<&VacancySummary> {
        let rows = self.rows.ready()?;
        rows.get(self.table_state.selected().unwrap_or(0))
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.last_len();
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(len - 1);
        self.table_state.select(Some(next));
    }

    fn focus_next(&mut self) {
        let pos = FilterField::ALL.iter().position(|&f| f == self.field).unwrap_or(0);
        self.field = FilterField::ALL[(pos + 1) % FilterField::ALL.len()];
    }

    fn focus_prev(&mut self) {
        let len = FilterField::ALL.len();
        let pos = FilterField::ALL.iter().position(|&f| f == self.field).unwrap_or(0);
        self.field = FilterField::ALL[(pos + len - 1) % len];
    }

    fn text_input_mut(&mut self) -> Option<&mut String> {
        let form = &mut self.listing.form;
        match self.field {
            FilterField::Title => Some(&mut form.title),
            FilterField::Location => Some(&mut form.location),
            FilterField::MinSalary => Some(&mut form.min_salary),
            FilterField::MaxSalary => Some(&mut form.max_salary),
            _ => None,
        }
    }

    fn cycle_selector(&mut self, forward: bool) {
        let Some(refs) = self.refs.ready().cloned() else {
            return;
        };
        let form = &mut self.listing.form;
        match self.field {
            FilterField::Experience => {
                let ids: Vec<i64> = refs.experiences.iter().map(|e| e.experience_id).collect();
                form.experience_id = cycle_option(form.experience_id, &ids, forward);
            }
            FilterField::WorkFormat => {
                let ids: Vec<i64> = refs.work_formats.iter().map(|w| w.work_format_id).collect();
                form.work_format_id = cycle_option(form.work_format_id, &ids, forward);
            }
            FilterField::WorkSchedule => {
                let ids: Vec<i64> = refs
                    .work_schedules
                    .iter()
                    .map(|w| w.work_schedule_id)
                    .collect();
                form.work_schedule_id = cycle_option(form.work_schedule_id, &ids, forward);
            }
            _ => {}
        }
    }

    fn skill_count(&self) -> usize {
        self.refs.ready().map_or(0, |r| r.skills.len())
    }

    fn toggle_skill_at_cursor(&mut self) {
        let id = self
            .refs
            .ready()
            .and_then(|r| r.skills.get(self.skill_cursor))
            .map(|s| s.skill_id);
        if let Some(id) = id {
            self.listing.toggle_skill(id);
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => self.mode = Mode::Browse,
            KeyCode::Enter => {
                self.listing.apply();
                self.mode = Mode::Browse;
                return Some(self.load());
            }
            KeyCode::Tab => self.focus_next(),
            KeyCode::BackTab => self.focus_prev(),
            code => match self.field {
                FilterField::Experience | FilterField::WorkFormat | FilterField::WorkSchedule => {
                    match code {
                        KeyCode::Left | KeyCode::Char('h') => self.cycle_selector(false),
                        KeyCode::Right | KeyCode::Char('l') => self.cycle_selector(true),
                        _ => {}
                    }
                }
                FilterField::ActiveOnly => {
                    if code == KeyCode::Char(' ') {
                        self.listing.form.active_only = !self.listing.form.active_only;
                    }
                }
                FilterField::Skills => match code {
                    KeyCode::Down | KeyCode::Char('j') => {
                        let max = self.skill_count().saturating_sub(1);
                        self.skill_cursor = (self.skill_cursor + 1).min(max);
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        self.skill_cursor = self.skill_cursor.saturating_sub(1);
                    }
                    KeyCode::Char(' ') => self.toggle_skill_at_cursor(),
                    _ => {}
                },
                _ => match code {
                    KeyCode::Backspace => {
                        if let Some(input) = self.text_input_mut() {
                            input.pop();
                        }
                    }
                    KeyCode::Char(c) => {
                        if let Some(input) = self.text_input_mut() {
                            input.push(c);
                        }
                    }
                    _ => {}
                },
            },
        }
        None
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Char('f' | '/') => self.mode = Mode::Filter,
            KeyCode::Enter => {
                return self.selected().map(|v| Action::OpenVacancy(v.vacancy_id));
            }
            KeyCode::Char('n') | KeyCode::Right => {
                if self.rows.ready().is_some() && self.listing.next_page(self.last_len()) {
                    return Some(self.load());
                }
            }
            KeyCode::Char('p') | KeyCode::Left => {
                if self.listing.prev_page() {
                    return Some(self.load());
                }
            }
            KeyCode::Char('c') => {
                self.listing.clear();
                return Some(self.load());
            }
            KeyCode::Char('r') => return Some(self.load()),
            _ => {}
        }
        None
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn selector_value(&self, field: FilterField) -> String {
        let Some(refs) = self.refs.ready() else {
            return match self.refs {
                ViewState::Failed(_) => "unavailable".into(),
                _ => "loading\u{2026}".into(),
            };
        };
        let form = &self.listing.form;
        let name = match field {
            FilterField::Experience => form.experience_id.and_then(|id| {
                refs.experiences
                    .iter()
                    .find(|e| e.experience_id == id)
                    .map(|e| e.name.clone())
            }),
            FilterField::WorkFormat => form.work_format_id.and_then(|id| {
                refs.work_formats
                    .iter()
                    .find(|w| w.work_format_id == id)
                    .map(|w| w.name.clone())
            }),
            FilterField::WorkSchedule => form.work_schedule_id.and_then(|id| {
                refs.work_schedules
                    .iter()
                    .find(|w| w.work_schedule_id == id)
                    .map(|w| w.name.clone())
            }),
            _ => None,
        };
        name.unwrap_or_else(|| "Any".into())
    }

    fn render_filters(&self, frame: &mut Frame, area: Rect) {
        let editing = self.mode == Mode::Filter;
        let title = if self.listing.is_dirty() {
            " Filters \u{25CF} "
        } else {
            " Filters "
        };
        let block = Block::default()
            .title(Span::styled(title, theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if editing {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut constraints = vec![Constraint::Length(1); FilterField::ALL.len() - 1];
        constraints.push(Constraint::Length(1)); // skills header
        constraints.push(Constraint::Min(0)); // skills list
        let rows = Layout::vertical(constraints).split(inner);

        let form = &self.listing.form;
        for (i, field) in FilterField::ALL.iter().copied().enumerate() {
            let active = editing && self.field == field;
            match field {
                FilterField::Title => {
                    form::inline_field(frame, rows[i], field.label(), &form.title, active, false);
                }
                FilterField::Location => {
                    form::inline_field(frame, rows[i], field.label(), &form.location, active, false);
                }
                FilterField::MinSalary => {
                    form::inline_field(frame, rows[i], field.label(), &form.min_salary, active, false);
                }
                FilterField::MaxSalary => {
                    form::inline_field(frame, rows[i], field.label(), &form.max_salary, active, false);
                }
                FilterField::Experience | FilterField::WorkFormat | FilterField::WorkSchedule => {
                    let value = self.selector_value(field);
                    form::inline_field(frame, rows[i], field.label(), &value, active, true);
                }
                FilterField::ActiveOnly => {
                    form::toggle(frame, rows[i], field.label(), form.active_only, active);
                }
                FilterField::Skills => {
                    let selected = form.skill_ids.len();
                    let header = format!("{} ({selected} selected)", field.label());
                    form::inline_field(frame, rows[i], &header, "", active, false);
                    self.render_skills(frame, rows[i + 1], active);
                }
            }
        }
    }

    fn render_skills(&self, frame: &mut Frame, area: Rect, active: bool) {
        let Some(refs) = self.refs.ready() else {
            return;
        };
        let height = usize::from(area.height);
        if height == 0 {
            return;
        }
        let start = self.skill_cursor.saturating_sub(height.saturating_sub(1));
        let width = usize::from(area.width).saturating_sub(8);

        let lines: Vec<Line> = refs
            .skills
            .iter()
            .enumerate()
            .skip(start)
            .take(height)
            .map(|(i, skill)| {
                let checked = self.listing.form.has_skill(skill.skill_id);
                let marker = if checked { "[\u{2713}]" } else { "[ ]" };
                let at_cursor = active && i == self.skill_cursor;
                let style = if at_cursor {
                    theme::table_selected()
                } else if checked {
                    Style::default().fg(theme::GREEN)
                } else {
                    theme::table_row()
                };
                Line::from(Span::styled(
                    format!("   {marker} {}", bars::truncate(&skill.name, width)),
                    style,
                ))
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let Some(rows) = view_state::placeholder(
            frame,
            area,
            &self.rows,
            "No vacancies match these filters",
            &self.throbber,
        ) else {
            return;
        };

        let header = Row::new(
            ["ID", "Title", "Company", "Location", "Salary", "Experience"]
                .into_iter()
                .map(|h| Cell::from(h).style(theme::table_header())),
        );
        let selected = self.table_state.selected().unwrap_or(0);
        let body: Vec<Row> = rows
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let style = if i == selected {
                    theme::table_selected()
                } else {
                    theme::table_row()
                };
                Row::new(vec![
                    Cell::from(v.vacancy_id.to_string()),
                    Cell::from(v.title.clone()),
                    Cell::from(v.company.as_ref().map_or("-", |c| c.name.as_str()).to_owned()),
                    Cell::from(v.location.clone().unwrap_or_else(|| "-".into())),
                    Cell::from(format_salary(v.salary_from, v.salary_to, v.currency.as_deref()))
                        .style(theme::salary()),
                    Cell::from(
                        v.experience
                            .as_ref()
                            .map_or("-", |e| e.name.as_str())
                            .to_owned(),
                    ),
                ])
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(8),
            Constraint::Fill(3),
            Constraint::Fill(2),
            Constraint::Fill(1),
            Constraint::Length(22),
            Constraint::Length(14),
        ];
        let table = Table::new(body, widths)
            .header(header)
            .row_highlight_style(theme::table_selected());
        let mut state = self.table_state;
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_pager(&self, frame: &mut Frame, area: Rect) {
        let can_prev = self.listing.has_prev();
        let can_next = self.rows.ready().is_some() && Listing::has_next(self.last_len());
        let style = |enabled: bool| {
            if enabled {
                theme::key_hint_key()
            } else {
                theme::disabled()
            }
        };

        let hints = match self.mode {
            Mode::Browse => "  f filter  c clear  Enter open  r reload",
            Mode::Filter => "  Tab next  \u{25C2}/\u{25B8} choose  Space toggle  Enter apply  Esc close",
        };
        let line = Line::from(vec![
            Span::styled(" \u{25C2} prev ", style(can_prev)),
            Span::styled(format!(" page {} ", self.listing.page() + 1), theme::tab_active()),
            Span::styled(" next \u{25B8} ", style(can_next)),
            Span::styled(hints, theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

impl Component for VacanciesScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        action_tx.send(Action::LoadReferences)?;
        action_tx.send(self.load())?;
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match self.mode {
            Mode::Filter => self.handle_filter_key(key),
            Mode::Browse => self.handle_browse_key(key),
        })
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::LoadVacancies(_) => self.rows = ViewState::Loading,
            Action::VacanciesLoaded(state) => {
                self.rows = state.clone();
                let any = self.last_len() > 0;
                self.table_state.select(any.then_some(0));
            }
            Action::LoadReferences => self.refs = ViewState::Loading,
            Action::ReferencesLoaded(state) => {
                self.refs = state.clone();
                if let ViewState::Failed(message) = state {
                    if let Some(tx) = &self.action_tx {
                        tx.send(Action::Notify(Notification::warning(format!(
                            "Filter lists unavailable: {message}"
                        ))))?;
                    }
                }
            }
            Action::Tick if self.rows.is_loading() => self.throbber.calc_next(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(Span::styled(" Vacancies ", theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let outer = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);

        let mode_tabs = sub_tabs::render_sub_tabs(
            &["Browse", "Filter"],
            usize::from(self.mode == Mode::Filter),
        );
        frame.render_widget(Paragraph::new(mode_tabs), outer[0]);

        let cols = Layout::horizontal([Constraint::Length(FILTER_PANEL_WIDTH), Constraint::Min(20)])
            .split(outer[1]);
        self.render_filters(frame, cols[0]);
        self.render_table(frame, cols[1]);
        self.render_pager(frame, outer[2]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn captures_input(&self) -> bool {
        self.mode == Mode::Filter
    }
}
