//! Preview area rendering

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame,
};

use crate::color_space::{to_terminal_color, Rgb};
use crate::preview::{LineStyle, PreviewLine};
use crate::state::{AppState, FocusedWidget};
use crate::ui::widgets::to_ratatui_color;

/// Render the preview area
pub fn render_preview(frame: &mut Frame, area: Rect, state: &AppState) {
    let is_focused = state.focus == FocusedWidget::Preview;

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(
            " Preview ",
            Style::default().add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let preview = state.session.preview();
    let base = base_style(preview.background(), state);

    if preview.lines().is_empty() {
        render_placeholder(frame, inner, state, base);
    } else {
        render_preview_content(frame, inner, preview.lines(), state.preview_scroll, base);
    }
}

/// Palette background with a readable foreground
fn base_style(background: Rgb, state: &AppState) -> Style {
    let support = state.capabilities.color_support;
    match to_ratatui_color(to_terminal_color(background, support)) {
        Some(bg) => {
            let fg = if background.prefers_dark_text() {
                Color::Black
            } else {
                Color::White
            };
            Style::default().bg(bg).fg(fg)
        }
        None => Style::default(),
    }
}

/// Render the preview content with scrolling
fn render_preview_content(
    frame: &mut Frame,
    area: Rect,
    content: &[PreviewLine],
    scroll: usize,
    base: Style,
) {
    let lines: Vec<Line> = content
        .iter()
        .skip(scroll)
        .take(area.height as usize)
        .map(|line| {
            let style = match line.style {
                LineStyle::Heading => base.add_modifier(Modifier::BOLD),
                LineStyle::Rule => base.add_modifier(Modifier::DIM),
                LineStyle::ListItem | LineStyle::Plain => base,
            };
            Line::from(Span::styled(line.text.clone(), style))
        })
        .collect();

    let total_lines = content.len();
    let visible_lines = area.height as usize;

    let widget = Paragraph::new(lines)
        .style(base)
        .wrap(Wrap { trim: false });

    frame.render_widget(widget, area);

    // Render scrollbar if content is scrollable
    if total_lines > visible_lines {
        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));

        let mut scrollbar_state = ScrollbarState::default()
            .content_length(total_lines)
            .position(scroll)
            .viewport_content_length(visible_lines);

        let scrollbar_area = Rect {
            x: area.x + area.width.saturating_sub(1),
            y: area.y,
            width: 1,
            height: area.height,
        };

        frame.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);
    }
}

/// Render placeholder when no content
fn render_placeholder(frame: &mut Frame, area: Rect, state: &AppState, base: Style) {
    let hint = if state.session.inputs().missing_fields().is_empty() {
        "Press [G] to generate"
    } else {
        "Fill prompt, font and image, then press [G]"
    };

    let message = vec![
        Line::from(""),
        Line::from(Span::styled("Nothing to preview", base.add_modifier(Modifier::DIM))),
        Line::from(""),
        Line::from(Span::styled(hint, base)),
    ];

    let widget = Paragraph::new(message)
        .style(base)
        .alignment(ratatui::layout::Alignment::Center);

    frame.render_widget(widget, area);
}
