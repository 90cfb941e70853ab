//! Source editor pane

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::state::{AppState, EditTarget, FocusedWidget};
use crate::unicode_handler::{display_width, expand_tabs};

/// Render the working copy with an optional gutter and the edit cursor
pub fn render_editor(frame: &mut Frame, area: Rect, state: &AppState) {
    let is_focused = state.focus == FocusedWidget::Editor;
    let is_editing = state.editing == Some(EditTarget::Source);

    let border_style = if is_editing {
        Style::default().fg(Color::Green)
    } else if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let mut title = format!(" Source ({}) ", state.session.format().name());
    if state.session.has_unapplied_edits() {
        title.push_str("* ");
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(title, Style::default().add_modifier(Modifier::BOLD)));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text = state.editor.text();
    if text.is_empty() && !is_editing {
        let hint = Paragraph::new(Line::from(Span::styled(
            "Nothing generated for this format yet - press [G]",
            Style::default().fg(Color::DarkGray),
        )));
        frame.render_widget(hint, inner);
        return;
    }

    let show_numbers = state.config.ui.show_line_numbers;
    let gutter_width = if show_numbers {
        state.editor.line_count().to_string().len() + 1
    } else {
        0
    };

    let cursor_line = state.editor.cursor_line();
    let lines: Vec<Line> = text
        .split('\n')
        .enumerate()
        .skip(state.editor.scroll)
        .take(inner.height as usize)
        .map(|(idx, raw)| {
            let mut spans = Vec::new();
            if show_numbers {
                let number_style = if idx == cursor_line && is_editing {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                spans.push(Span::styled(
                    format!("{:>width$} ", idx + 1, width = gutter_width - 1),
                    number_style,
                ));
            }
            spans.push(Span::raw(expand_tabs(raw)));
            Line::from(spans)
        })
        .collect();

    let mut widget = Paragraph::new(lines).style(Style::default().fg(Color::White));
    if state.config.ui.word_wrap {
        widget = widget.wrap(Wrap { trim: false });
    }
    frame.render_widget(widget, inner);

    if is_editing && cursor_line >= state.editor.scroll {
        let row = cursor_line - state.editor.scroll;
        let line_start = text[..state.editor.cursor()].rfind('\n').map_or(0, |i| i + 1);
        let column = display_width(&expand_tabs(&text[line_start..state.editor.cursor()]));
        let x = inner.x as usize + gutter_width + column;
        let y = inner.y as usize + row;
        if x < (inner.x + inner.width) as usize && y < (inner.y + inner.height) as usize {
            frame.set_cursor_position((x as u16, y as u16));
        }
    }
}
