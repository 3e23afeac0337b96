//! Overview screen: headline counts, salary summary and two histograms.
//!
//! ```text
//! ┌ Vacancies ┐┌ Active ┐┌ Companies ┐┌ Skills ┐┌ Salary ──────┐
//! ├ Top skills ─────────────────┤├ By experience ─────────────┤
//! ```

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use throbber_widgets_tui::ThrobberState;
use vacwatch_core::dashboard::format_count;
use vacwatch_core::{DashboardStats, ViewState};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::{bars, view_state};

const LABEL_WIDTH: usize = 18;

pub struct OverviewScreen {
    focused: bool,
    stats: ViewState<Arc<DashboardStats>>,
    throbber: ThrobberState,
}

impl OverviewScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            stats: ViewState::Loading,
            throbber: ThrobberState::default(),
        }
    }

    fn render_card(frame: &mut Frame, area: Rect, title: &str, value: String, style: Style) {
        let block = Block::default()
            .title(Span::styled(format!(" {title} "), theme::key_hint()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(
            Paragraph::new(Span::styled(value, style.add_modifier(Modifier::BOLD)))
                .alignment(ratatui::layout::Alignment::Center),
            inner,
        );
    }

    fn render_cards(frame: &mut Frame, area: Rect, stats: &DashboardStats) {
        let cols = Layout::horizontal([
            Constraint::Ratio(1, 6),
            Constraint::Ratio(1, 6),
            Constraint::Ratio(1, 6),
            Constraint::Ratio(1, 6),
            Constraint::Ratio(2, 6),
        ])
        .split(area);

        let o = &stats.overview;
        let number = Style::default().fg(theme::CYAN);
        Self::render_card(frame, cols[0], "Vacancies", format_count(o.total_vacancies), number);
        Self::render_card(frame, cols[1], "Active", format_count(o.active_vacancies), number);
        Self::render_card(frame, cols[2], "Companies", format_count(o.total_companies), number);
        Self::render_card(frame, cols[3], "Skills", format_count(o.total_skills), number);

        let average = stats.salary.average_salary.map_or_else(
            || "No data".to_owned(),
            |avg| format!("avg {avg:.0}"),
        );
        Self::render_card(
            frame,
            cols[4],
            "Salary",
            format!(
                "{} with salary · {average}",
                format_count(stats.salary.with_salary)
            ),
            theme::salary(),
        );
    }

    /// Horizontal bar chart; `rows` is `(label, count)`.
    fn render_histogram(frame: &mut Frame, area: Rect, title: &str, rows: &[(&str, u64)]) {
        let block = Block::default()
            .title(Span::styled(format!(" {title} "), theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if rows.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(" No data", theme::key_hint())),
                inner,
            );
            return;
        }

        let max = rows.iter().map(|(_, n)| *n).max().unwrap_or(0);
        let count_width = rows
            .iter()
            .map(|(_, n)| format_count(*n).len())
            .max()
            .unwrap_or(1);
        let bar_width = usize::from(inner.width).saturating_sub(LABEL_WIDTH + count_width + 4);
        let bar_width = u16::try_from(bar_width).unwrap_or(u16::MAX);

        let lines: Vec<Line> = rows
            .iter()
            .take(usize::from(inner.height))
            .enumerate()
            .map(|(i, (label, count))| {
                let color = if i == 0 { theme::ACCENT } else { theme::CYAN };
                Line::from(vec![
                    Span::styled(
                        format!(" {:<LABEL_WIDTH$}", bars::truncate(label, LABEL_WIDTH)),
                        theme::table_row(),
                    ),
                    Span::styled(bars::count_bar(*count, max, bar_width), Style::default().fg(color)),
                    Span::styled(
                        format!(" {:>count_width$}", format_count(*count)),
                        theme::key_hint(),
                    ),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

impl Component for OverviewScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('r') => Ok(Some(Action::LoadOverview)),
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::LoadOverview => self.stats = ViewState::Loading,
            Action::OverviewLoaded(state) => self.stats = state.clone(),
            Action::Tick if self.stats.is_loading() => self.throbber.calc_next(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(Span::styled(" Overview ", theme::title_style()))
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
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("  r ", theme::key_hint_key()),
                Span::styled("refresh", theme::key_hint()),
            ])),
            layout[2],
        );

        let Some(stats) =
            view_state::placeholder(frame, inner, &self.stats, "No statistics yet", &self.throbber)
        else {
            return;
        };

        Self::render_cards(frame, layout[0], stats);

        let panels =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(layout[1]);
        let skills: Vec<(&str, u64)> = stats
            .top_skills
            .iter()
            .map(|s| (s.skill.as_str(), s.count))
            .collect();
        let experience: Vec<(&str, u64)> = stats
            .experience_distribution
            .iter()
            .map(|b| (b.experience.as_str(), b.count))
            .collect();
        Self::render_histogram(frame, panels[0], "Top skills", &skills);
        Self::render_histogram(frame, panels[1], "By experience", &experience);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
