//! Input form and palette widgets

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::color_space::{parse_color, to_terminal_color, Rgb, TerminalColor};
use crate::inputs::OutputFormat;
use crate::state::{AppState, EditTarget, FormField};
use crate::terminal_capabilities::ColorSupport;
use crate::unicode_handler::{display_width, first_line, skip_columns, truncate_with_ellipsis};

/// Render the prompt/font/image/format rows
pub fn render_form_fields(frame: &mut Frame, area: Rect, state: &AppState, is_focused: bool) {
    let inputs = state.session.inputs();
    let value_width = (area.width as usize).saturating_sub(10);
    let mut lines = Vec::new();

    for field in FormField::all() {
        let is_selected = is_focused && state.selected_field == *field;
        let editing = matches!(
            (field, state.editing),
            (FormField::Prompt, Some(EditTarget::Prompt)) | (FormField::Font, Some(EditTarget::Font))
        );

        let line = match field {
            FormField::Format => create_format_line(state.session.format(), is_selected),
            _ if editing => create_editing_line(field.name(), state, value_width),
            FormField::Prompt => create_setting_line(
                field.name(),
                &placeholder(first_line(inputs.prompt()), "[Describe the UI...]"),
                is_selected,
                value_width,
            ),
            FormField::Font => create_setting_line(
                field.name(),
                &placeholder(inputs.font(), "[Font name]"),
                is_selected,
                value_width,
            ),
            FormField::Image => {
                let value = match inputs.image() {
                    Some(image) => match image.dimensions {
                        Some((w, h)) => format!("{} {}x{}", image.file_name, w, h),
                        None => image.file_name.clone(),
                    },
                    None => "[L] to load".to_string(),
                };
                create_setting_line(field.name(), &value, is_selected, value_width)
            }
        };
        lines.push(line);
    }

    // Action buttons
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        action_span("[G]", "Generate"),
        action_span("[A]", "Apply"),
    ]));

    let widget = Paragraph::new(lines);
    frame.render_widget(widget, area);
}

/// One row per palette entry: a swatch block and the raw color string
pub fn render_palette_swatches(frame: &mut Frame, area: Rect, state: &AppState) {
    let palette = state.session.palette();
    let support = state.capabilities.color_support;

    let lines: Vec<Line> = if palette.is_empty() {
        vec![Line::from(Span::styled(
            "No colors yet",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        let label_width = (area.width as usize).saturating_sub(6);
        palette
            .iter()
            .take(area.height as usize)
            .map(|entry| swatch_line(entry, support, label_width))
            .collect()
    };

    frame.render_widget(Paragraph::new(lines), area);
}

fn swatch_line(entry: &str, support: ColorSupport, label_width: usize) -> Line<'static> {
    let label = truncate_with_ellipsis(entry, label_width);
    match parse_color(entry) {
        Some(rgb) => {
            let swatch = match to_ratatui_color(to_terminal_color(rgb, support)) {
                Some(color) => Span::styled("    ", Style::default().bg(color)),
                None => Span::raw("[  ]"),
            };
            Line::from(vec![
                Span::raw(" "),
                swatch,
                Span::raw(" "),
                Span::styled(label, Style::default().fg(Color::White)),
            ])
        }
        None => Line::from(vec![
            Span::raw(" "),
            Span::styled(" ?? ", Style::default().fg(Color::DarkGray)),
            Span::raw(" "),
            Span::styled(label, Style::default().fg(Color::DarkGray)),
        ]),
    }
}

/// Map a quantized color onto ratatui; `None` when color is disabled
pub fn to_ratatui_color(color: TerminalColor) -> Option<Color> {
    match color {
        TerminalColor::Rgb(Rgb { r, g, b }) => Some(Color::Rgb(r, g, b)),
        TerminalColor::Indexed(index) => Some(Color::Indexed(index)),
        TerminalColor::None => None,
    }
}

fn placeholder(value: &str, empty: &str) -> String {
    if value.trim().is_empty() {
        empty.to_string()
    } else {
        value.to_string()
    }
}

/// Create a setting line with label and value
fn create_setting_line(label: &str, value: &str, is_selected: bool, width: usize) -> Line<'static> {
    let indicator = if is_selected { "▸" } else { " " };
    let indicator_style = Style::default().fg(Color::Cyan);

    let label_style = if is_selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let value_style = if is_selected {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    Line::from(vec![
        Span::styled(format!("{} ", indicator), indicator_style),
        Span::styled(format!("{:<7}", format!("{}:", label)), label_style),
        Span::styled(truncate_with_ellipsis(value, width), value_style),
    ])
}

/// Row that is being typed into, scrolled so the cursor stays visible
fn create_editing_line(label: &str, state: &AppState, width: usize) -> Line<'static> {
    let buffer = &state.field_buffer;
    let (before, after) = buffer.text().split_at(buffer.cursor());
    let overflow = (display_width(before) + 1).saturating_sub(width);
    let before = skip_columns(before, overflow);
    let after = truncate_with_ellipsis(after, width.saturating_sub(display_width(before) + 1));

    Line::from(vec![
        Span::styled("▸ ", Style::default().fg(Color::Cyan)),
        Span::styled(
            format!("{:<7}", format!("{}:", label)),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::styled(before.to_string(), Style::default().fg(Color::Green)),
        Span::styled("▌", Style::default().fg(Color::Green)),
        Span::styled(after, Style::default().fg(Color::Green)),
    ])
}

fn create_format_line(current: OutputFormat, is_selected: bool) -> Line<'static> {
    let indicator = if is_selected { "▸" } else { " " };
    let mut spans = vec![
        Span::styled(format!("{} ", indicator), Style::default().fg(Color::Cyan)),
        Span::styled(
            "Format:",
            if is_selected {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            },
        ),
    ];

    for format in OutputFormat::all() {
        let active = *format == current;
        let bullet = if active { "●" } else { "○" };
        let style = if active {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} {}", bullet, format.name()), style));
    }

    Line::from(spans)
}

/// Create an action span (button-like)
fn action_span(key: &str, label: &str) -> Span<'static> {
    Span::styled(
        format!("  {} {}", key, label),
        Style::default().fg(Color::Green),
    )
}
