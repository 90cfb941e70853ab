//! UI module
//!
//! Contains all UI rendering components using Ratatui.

mod editor;
mod help;
mod preview;
mod widgets;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::orchestrator::SessionPhase;
use crate::state::{AppState, FocusedWidget};
use crate::unicode_handler::{display_width, truncate_with_ellipsis};

const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Main render function - draws the entire UI
pub fn render(frame: &mut Frame, state: &AppState) {
    let size = frame.area();

    // Check minimum size
    if size.width < 40 || size.height < 15 {
        render_size_warning(frame, size);
        return;
    }

    // Main layout: title bar, content, status bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(size);

    render_title_bar(frame, main_chunks[0], state);
    render_main_content(frame, main_chunks[1], state);
    render_status_bar(frame, main_chunks[2], state);

    if state.load_prompt_active {
        render_load_prompt(frame, size, state);
    }

    // Render help overlay if active
    if state.show_help {
        help::render_help_overlay(frame, size);
    }
}

/// Render warning when terminal is too small
fn render_size_warning(frame: &mut Frame, area: Rect) {
    let warning = Paragraph::new("Terminal too small!\nMinimum: 40x15")
        .style(Style::default().fg(Color::Red))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(warning, area);
}

/// Render the title bar
fn render_title_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let format = state.session.format().name();
    let title = Line::from(vec![
        Span::styled(
            " UI Generator ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            concat!("v", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(" │ "),
        Span::styled(format, Style::default().fg(Color::Yellow)),
        Span::raw(" ".repeat(
            (area.width as usize)
                .saturating_sub(42)
                .saturating_sub(format.len()),
        )),
        Span::styled("[?]", Style::default().fg(Color::Green)),
        Span::raw(" Help  "),
        Span::styled("[Q]", Style::default().fg(Color::Red)),
        Span::raw(" Quit "),
    ]);

    let title_widget =
        Paragraph::new(title).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(title_widget, area);
}

/// Render the main content area
fn render_main_content(frame: &mut Frame, area: Rect, state: &AppState) {
    // Responsive layout: side-by-side if wide enough, stacked if narrow
    if area.width >= 80 {
        render_wide_layout(frame, area, state);
    } else {
        render_narrow_layout(frame, area, state);
    }
}

/// Render side-by-side layout for wide terminals
fn render_wide_layout(frame: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(32), // Left panel
            Constraint::Min(40),    // Editor + preview
        ])
        .split(area);

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Input form
            Constraint::Min(4),    // Palette
        ])
        .split(chunks[0]);

    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    render_form(frame, left_chunks[0], state);
    render_palette(frame, left_chunks[1], state);
    editor::render_editor(frame, right_chunks[0], state);
    preview::render_preview(frame, right_chunks[1], state);
}

/// Render stacked layout for narrow terminals
fn render_narrow_layout(frame: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Input form
            Constraint::Length(3), // Palette
            Constraint::Min(5),    // Editor
            Constraint::Min(5),    // Preview
        ])
        .split(area);

    render_form(frame, chunks[0], state);
    render_palette(frame, chunks[1], state);
    editor::render_editor(frame, chunks[2], state);
    preview::render_preview(frame, chunks[3], state);
}

fn panel_block(title: &str, is_focused: bool) -> Block<'static> {
    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().add_modifier(Modifier::BOLD),
        ))
}

/// Render the input form
fn render_form(frame: &mut Frame, area: Rect, state: &AppState) {
    let is_focused = state.focus == FocusedWidget::Form;
    let block = panel_block("Inputs", is_focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    widgets::render_form_fields(frame, inner, state, is_focused);
}

/// Render the palette swatches
fn render_palette(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block("Palette", false);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    widgets::render_palette_swatches(frame, inner, state);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let status_color = if state.status_is_error {
        Color::Red
    } else {
        Color::White
    };

    let phase = state.session.phase();
    let phase_info = match phase {
        SessionPhase::Submitting => format!(
            "{} {}",
            SPINNER[state.spinner_tick % SPINNER.len()],
            phase.name()
        ),
        _ => phase.name().to_string(),
    };
    let timing = state
        .last_request_ms
        .map(|ms| format!(" │ {:>5}ms", ms))
        .unwrap_or_default();
    let edits = if state.session.has_unapplied_edits() {
        " │ modified"
    } else {
        ""
    };
    let right = format!("{}{}{}", phase_info, edits, timing);

    // Calculate spacing
    let available = (area.width as usize)
        .saturating_sub(display_width(&right))
        .saturating_sub(3);
    let status = truncate_with_ellipsis(&state.status_message, available);
    let spacing = available.saturating_sub(display_width(&status));

    let phase_style = match phase {
        SessionPhase::Submitting => Style::default().fg(Color::Yellow),
        SessionPhase::Ready => Style::default().fg(Color::Green),
        SessionPhase::Idle => Style::default().fg(Color::DarkGray),
    };

    let line = Line::from(vec![
        Span::raw(" "),
        Span::styled(status, Style::default().fg(status_color)),
        Span::raw(" ".repeat(spacing)),
        Span::raw(" "),
        Span::styled(right, phase_style),
        Span::raw(" "),
    ]);

    let widget =
        Paragraph::new(line).style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(widget, area);
}

/// Modal asking for an image path
fn render_load_prompt(frame: &mut Frame, area: Rect, state: &AppState) {
    let width = area.width.saturating_sub(10).min(70);
    let height = if state.load_prompt_error.is_some() { 5 } else { 4 };
    let modal = help::centered_rect(width, height, area);

    frame.render_widget(Clear, modal);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            " Load Image ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(modal);
    frame.render_widget(block, modal);

    let field_width = (inner.width as usize).saturating_sub(2);
    let input = crate::unicode_handler::skip_columns(
        &state.load_prompt_input,
        display_width(&state.load_prompt_input).saturating_sub(field_width),
    );

    let mut lines = vec![
        Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Green)),
            Span::styled(format!("{}▌", input), Style::default().fg(Color::White)),
        ]),
        Line::from(Span::styled(
            "Enter to load, Esc to cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    if let Some(ref err) = state.load_prompt_error {
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}
