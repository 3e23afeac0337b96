//! Form field renderers shared by the filter form and the watch settings.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::theme;

fn label_style(active: bool) -> Style {
    if active {
        Style::default().fg(theme::CYAN)
    } else {
        Style::default().fg(theme::TEXT)
    }
}

fn boxed(frame: &mut Frame, area: Rect, label: &str, active: bool) -> Option<Rect> {
    if area.height < 3 {
        return None;
    }
    frame.render_widget(
        Paragraph::new(Span::styled(label, label_style(active))),
        Rect::new(area.x, area.y, area.width, 1),
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if active {
            theme::border_focused()
        } else {
            theme::border_default()
        });
    let block_area = Rect::new(area.x, area.y + 1, area.width, 3.min(area.height - 1));
    let inner = block.inner(block_area);
    frame.render_widget(block, block_area);
    Some(inner)
}

/// Label on the first row, bordered text box below (4 rows total).
pub fn input_field(frame: &mut Frame, area: Rect, label: &str, value: &str, active: bool) {
    let Some(inner) = boxed(frame, area, label, active) else {
        return;
    };
    let text = if active {
        format!("{value}\u{2588}")
    } else {
        value.to_owned()
    };
    frame.render_widget(
        Paragraph::new(Span::styled(text, Style::default().fg(theme::CYAN))),
        inner,
    );
}

/// `[✓] label` on a single row.
pub fn toggle(frame: &mut Frame, area: Rect, label: &str, value: bool, active: bool) {
    if area.height < 1 {
        return;
    }
    let marker = if value { "[\u{2713}]" } else { "[ ]" };
    let marker_style = if active {
        Style::default().fg(theme::ACCENT)
    } else if value {
        Style::default().fg(theme::GREEN)
    } else {
        Style::default().fg(theme::MUTED)
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(format!("  {marker} "), marker_style),
            Span::styled(label, label_style(active)),
        ])),
        area,
    );
}

/// Compact single-row field: `▸ Label      value█`. Selectors show arrows.
pub fn inline_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    active: bool,
    selector: bool,
) {
    if area.height < 1 {
        return;
    }
    let pointer = if active { "\u{25B8} " } else { "  " };
    let mut spans = vec![
        Span::styled(pointer, Style::default().fg(theme::ACCENT)),
        Span::styled(format!("{label:<11}"), label_style(active)),
    ];
    let value_style = if active {
        Style::default().fg(theme::CYAN)
    } else {
        Style::default().fg(theme::TEXT)
    };
    if selector {
        spans.push(Span::styled("\u{25C2} ", theme::key_hint()));
        spans.push(Span::styled(value.to_owned(), value_style));
        spans.push(Span::styled(" \u{25B8}", theme::key_hint()));
    } else if active {
        spans.push(Span::styled(format!("{value}\u{2588}"), value_style));
    } else {
        spans.push(Span::styled(value.to_owned(), value_style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Centered panel with a titled rounded border. Returns the inner area.
pub fn centered_panel(frame: &mut Frame, area: Rect, title: &str, width: u16, height: u16) -> Rect {
    let w = width.min(area.width.saturating_sub(4));
    let h = height.min(area.height.saturating_sub(2));
    let panel = Rect::new(
        area.x + area.width.saturating_sub(w) / 2,
        area.y + area.height.saturating_sub(h) / 2,
        w,
        h,
    );

    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG_DARK)),
        panel,
    );
    let block = Block::default()
        .title(Span::styled(format!(" {title} "), theme::title_style()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused());
    let inner = block.inner(panel);
    frame.render_widget(block, panel);
    inner
}
