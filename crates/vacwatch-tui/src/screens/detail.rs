//! Vacancy detail: id prompt, fields, skills and a scrollable description.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use throbber_widgets_tui::ThrobberState;
use vacwatch_core::dashboard::{format_salary, parse_vacancy_id};
use vacwatch_core::{Vacancy, ViewState};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::{form, sub_tabs, view_state};

const KEY_WIDTH: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Info,
    Description,
}

pub struct DetailScreen {
    focused: bool,
    input: String,
    editing: bool,
    vacancy: ViewState<Arc<Vacancy>>,
    section: Section,
    scroll: u16,
    throbber: ThrobberState,
}

impl DetailScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            input: String::new(),
            editing: false,
            vacancy: ViewState::Empty,
            section: Section::Info,
            scroll: 0,
            throbber: ThrobberState::default(),
        }
    }

    /// Validate the typed id. A bad id never reaches the API.
    fn submit(&mut self) -> Option<Action> {
        self.editing = false;
        match parse_vacancy_id(&self.input) {
            Ok(id) => Some(Action::LoadVacancy(id)),
            Err(e) => {
                self.vacancy = ViewState::from_error(&e);
                None
            }
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Enter => return self.submit(),
            KeyCode::Esc => self.editing = false,
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
        None
    }

    fn field_line<'a>(key: &'a str, value: String, style: Style) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("  {key:<KEY_WIDTH$}"), theme::key_hint()),
            Span::styled(value, style),
        ])
    }

    fn info_lines(vacancy: &Vacancy) -> Vec<Line<'_>> {
        let v = &vacancy.summary;
        let text = theme::table_row();
        let dash = || "-".to_owned();

        let mut lines = vec![
            Line::from(Span::styled(
                format!("  {}", v.title),
                Style::default()
                    .fg(theme::CYAN)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Self::field_line(
                "Company",
                v.company.as_ref().map_or_else(dash, |c| c.name.clone()),
                text,
            ),
            Self::field_line(
                "Salary",
                format_salary(v.salary_from, v.salary_to, v.currency.as_deref()),
                theme::salary(),
            ),
            Self::field_line(
                "Location",
                v.location
                    .clone()
                    .or_else(|| v.parsed_address.clone())
                    .or_else(|| v.raw_address.clone())
                    .unwrap_or_else(dash),
                text,
            ),
            Self::field_line(
                "Experience",
                v.experience.as_ref().map_or_else(dash, |e| e.name.clone()),
                text,
            ),
            Self::field_line(
                "Format",
                vacancy
                    .work_format
                    .as_ref()
                    .map_or_else(dash, |w| w.name.clone()),
                text,
            ),
            Self::field_line(
                "Schedule",
                vacancy
                    .work_schedule
                    .as_ref()
                    .map_or_else(dash, |w| w.name.clone()),
                text,
            ),
            Self::field_line(
                "Published",
                v.published_date.clone().unwrap_or_else(dash),
                text,
            ),
            Self::field_line(
                "Status",
                if v.is_active { "active" } else { "closed" }.to_owned(),
                if v.is_active {
                    Style::default().fg(theme::GREEN)
                } else {
                    theme::disabled()
                },
            ),
            Self::field_line("Source", v.source_url.clone(), Style::default().fg(theme::CYAN)),
            Line::from(""),
            Line::from(Span::styled("  Skills", theme::title_style())),
        ];

        if vacancy.skills.is_empty() {
            lines.push(Line::from(Span::styled("    none listed", theme::key_hint())));
        }
        for skill in &vacancy.skills {
            let name = skill
                .name
                .clone()
                .unwrap_or_else(|| format!("#{}", skill.skill_id));
            let marker = if skill.is_mandatory { "*" } else { " " };
            let mut spans = vec![
                Span::styled(format!("    {marker} "), Style::default().fg(theme::ACCENT)),
                Span::styled(name, text),
            ];
            if let Some(category) = &skill.category {
                spans.push(Span::styled(format!("  {category}"), theme::key_hint()));
            }
            lines.push(Line::from(spans));
        }
        lines
    }
}

impl Component for DetailScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.editing {
            return Ok(self.handle_input_key(key));
        }
        let action = match key.code {
            KeyCode::Char('/' | 'i') => {
                self.editing = true;
                None
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll = self.scroll.saturating_add(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                None
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.section = Section::Info;
                self.scroll = 0;
                None
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.section = Section::Description;
                self.scroll = 0;
                None
            }
            KeyCode::Char('r') => parse_vacancy_id(&self.input).ok().map(Action::LoadVacancy),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::OpenVacancy(id) => {
                self.input = id.to_string();
                self.editing = false;
                return Ok(Some(Action::LoadVacancy(*id)));
            }
            Action::LoadVacancy(id) => {
                self.input = id.to_string();
                self.vacancy = ViewState::Loading;
                self.section = Section::Info;
                self.scroll = 0;
            }
            Action::VacancyLoaded(state) => self.vacancy = state.clone(),
            Action::Tick if self.vacancy.is_loading() => self.throbber.calc_next(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(Span::styled(" Vacancy ", theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);

        form::inline_field(frame, layout[0], "Vacancy id", &self.input, self.editing, false);
        let section = match self.section {
            Section::Info => 0,
            Section::Description => 1,
        };
        frame.render_widget(
            Paragraph::new(sub_tabs::render_sub_tabs(&["Info", "Description"], section)),
            layout[2],
        );

        let hints = if self.editing {
            "  Enter load  Esc cancel"
        } else {
            "  / id  \u{25C2}/\u{25B8} section  j/k scroll  r reload  Esc back"
        };
        frame.render_widget(
            Paragraph::new(Span::styled(hints, theme::key_hint())),
            layout[4],
        );

        let Some(vacancy) = view_state::placeholder(
            frame,
            layout[3],
            &self.vacancy,
            "Press / and type a vacancy id, or open one from Vacancies",
            &self.throbber,
        ) else {
            return;
        };

        let paragraph = match self.section {
            Section::Info => Paragraph::new(Self::info_lines(vacancy)),
            Section::Description => {
                let text = vacancy.summary.description.trim();
                let text = if text.is_empty() { "No description." } else { text };
                Paragraph::new(text).style(theme::table_row())
            }
        };
        frame.render_widget(
            paragraph.wrap(Wrap { trim: false }).scroll((self.scroll, 0)),
            layout[3],
        );
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn captures_input(&self) -> bool {
        self.editing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_id(screen: &mut DetailScreen, raw: &str) -> Option<Action> {
        screen.handle_key_event(key(KeyCode::Char('/'))).expect("key");
        for c in raw.chars() {
            screen.handle_key_event(key(KeyCode::Char(c))).expect("key");
        }
        screen.handle_key_event(key(KeyCode::Enter)).expect("key")
    }

    #[test]
    fn invalid_id_never_loads() {
        let mut screen = DetailScreen::new();
        assert!(type_id(&mut screen, "12abc").is_none());
        assert!(matches!(screen.vacancy, ViewState::Invalid(_)));
        assert!(!screen.captures_input());
    }

    #[test]
    fn numeric_id_loads() {
        let mut screen = DetailScreen::new();
        assert!(matches!(type_id(&mut screen, "42"), Some(Action::LoadVacancy(42))));
    }

    #[test]
    fn opening_from_the_list_fills_the_prompt() {
        let mut screen = DetailScreen::new();
        let follow = screen.update(&Action::OpenVacancy(7)).expect("update");
        assert!(matches!(follow, Some(Action::LoadVacancy(7))));
        assert_eq!(screen.input, "7");

        screen.update(&Action::LoadVacancy(7)).expect("update");
        assert!(screen.vacancy.is_loading());
    }
}
