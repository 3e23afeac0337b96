//! Loading / invalid / failed / empty placeholders for data panels.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use throbber_widgets_tui::{Throbber, ThrobberState};
use vacwatch_core::ViewState;

use crate::theme;

/// Render the placeholder for any non-`Ready` state.
///
/// Returns the payload when the state is `Ready`, so callers can write
/// `let Some(data) = view_state::placeholder(...) else { return };`.
pub fn placeholder<'a, T>(
    frame: &mut Frame,
    area: Rect,
    state: &'a ViewState<T>,
    empty_message: &str,
    throbber: &ThrobberState,
) -> Option<&'a T> {
    let line = match state {
        ViewState::Ready(data) => return Some(data),
        ViewState::Loading => {
            let throbber_widget = Throbber::default()
                .label(" Loading\u{2026}")
                .style(Style::default().fg(theme::CYAN))
                .throbber_style(Style::default().fg(theme::ACCENT));
            let row = Rect::new(area.x + 1, area.y + area.height / 2, area.width.saturating_sub(2), 1);
            frame.render_stateful_widget(throbber_widget, row, &mut throbber.clone());
            return None;
        }
        ViewState::Invalid(message) => Line::from(vec![
            Span::styled("! ", Style::default().fg(theme::AMBER)),
            Span::styled(message.as_str(), Style::default().fg(theme::AMBER)),
        ]),
        ViewState::Failed(message) => Line::from(vec![
            Span::styled("\u{2717} ", theme::error()),
            Span::styled(message.as_str(), theme::error()),
        ]),
        ViewState::Empty => Line::from(Span::styled(empty_message, theme::key_hint())),
    };

    let row = Rect::new(area.x, area.y + area.height / 2, area.width, area.height.div_ceil(2));
    frame.render_widget(
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        row,
    );
    None
}
