//! Input handling
//!
//! Maps keyboard events to state transitions with context-sensitive bindings.

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::artifact::ExportKind;
use crate::inputs::OutputFormat;
use crate::state::{AppState, EditTarget, FocusedWidget, FormField};

/// Handle an input event
pub fn handle_event(event: Event, state: &mut AppState) -> Result<()> {
    match event {
        Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
            handle_key_event(key_event, state)
        }
        Event::Paste(text) => {
            handle_paste(&text, state);
            Ok(())
        }
        // Resize is already handled in main loop
        _ => Ok(()),
    }
}

/// Handle a key event
fn handle_key_event(key: KeyEvent, state: &mut AppState) -> Result<()> {
    // Handle help overlay
    if state.show_help {
        return handle_help_input(key, state);
    }

    // Handle interactive load prompt
    if state.load_prompt_active {
        return handle_load_prompt_input(key, state);
    }

    // Handle text entry
    match state.editing {
        Some(EditTarget::Source) => return handle_source_input(key, state),
        Some(EditTarget::Prompt | EditTarget::Font) => return handle_field_input(key, state),
        None => {}
    }

    // Global shortcuts
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => {
            state.should_quit = true;
            return Ok(());
        }
        KeyCode::Char('?') => {
            state.show_help = true;
            return Ok(());
        }
        KeyCode::Tab => {
            state.focus = state.focus.next();
            return Ok(());
        }
        KeyCode::BackTab => {
            state.focus = state.focus.prev();
            return Ok(());
        }
        KeyCode::Char('g') | KeyCode::Char('G') => {
            state.trigger_generate();
            return Ok(());
        }
        KeyCode::Char('a') | KeyCode::Char('A') => {
            state.apply_edits();
            return Ok(());
        }
        KeyCode::Char('f') | KeyCode::Char('F') => {
            state.toggle_format();
            return Ok(());
        }
        KeyCode::Char('d') | KeyCode::Char('D') => {
            state.download(ExportKind::primary(state.session.format()));
            return Ok(());
        }
        KeyCode::Char('s') | KeyCode::Char('S') => {
            state.download(ExportKind::Shopify);
            return Ok(());
        }
        KeyCode::Char('p') | KeyCode::Char('P') => {
            state.save_preview_page();
            return Ok(());
        }
        KeyCode::Char('c') | KeyCode::Char('C') => {
            state.copy_working_copy();
            return Ok(());
        }
        KeyCode::Char('l') | KeyCode::Char('L') => {
            state.start_load_prompt();
            return Ok(());
        }
        _ => {}
    }

    // Context-sensitive handling
    match state.focus {
        FocusedWidget::Form => handle_form_input(key, state),
        FocusedWidget::Editor => handle_editor_input(key, state),
        FocusedWidget::Preview => handle_preview_input(key, state),
    }
    Ok(())
}

/// Handle input when help overlay is shown
fn handle_help_input(key: KeyEvent, state: &mut AppState) -> Result<()> {
    match key.code {
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Enter => {
            state.show_help = false;
        }
        _ => {}
    }
    Ok(())
}

/// Handle input for the interactive load prompt
fn handle_load_prompt_input(key: KeyEvent, state: &mut AppState) -> Result<()> {
    match key.code {
        KeyCode::Esc => {
            state.cancel_load_prompt();
        }
        KeyCode::Enter => {
            state.submit_load_prompt();
        }
        KeyCode::Backspace => {
            state.load_prompt_input.pop();
        }
        KeyCode::Char(c) => {
            state.load_prompt_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

/// Single-line editing of the prompt or font
fn handle_field_input(key: KeyEvent, state: &mut AppState) -> Result<()> {
    match key.code {
        KeyCode::Enter => state.end_edit(true),
        KeyCode::Esc => state.end_edit(false),
        KeyCode::Backspace => {
            state.field_buffer.backspace();
        }
        KeyCode::Delete => {
            state.field_buffer.delete();
        }
        KeyCode::Left => state.field_buffer.move_left(),
        KeyCode::Right => state.field_buffer.move_right(),
        KeyCode::Home => state.field_buffer.home(),
        KeyCode::End => state.field_buffer.end(),
        KeyCode::Char(c) => state.field_buffer.insert_char(c),
        _ => {}
    }
    Ok(())
}

/// Multi-line editing of the working copy
fn handle_source_input(key: KeyEvent, state: &mut AppState) -> Result<()> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let mut changed = false;

    match key.code {
        KeyCode::Esc => {
            state.end_edit(true);
            return Ok(());
        }
        KeyCode::Char('a') if ctrl => {
            state.apply_edits();
            return Ok(());
        }
        KeyCode::Enter => {
            state.editor.newline();
            changed = true;
        }
        KeyCode::Tab => {
            state.editor.insert_str("    ");
            changed = true;
        }
        KeyCode::Backspace => changed = state.editor.backspace(),
        KeyCode::Delete => changed = state.editor.delete(),
        KeyCode::Left => state.editor.move_left(),
        KeyCode::Right => state.editor.move_right(),
        KeyCode::Up => state.editor.move_up(),
        KeyCode::Down => state.editor.move_down(),
        KeyCode::Home => state.editor.home(),
        KeyCode::End => state.editor.end(),
        KeyCode::Char(c) if !ctrl => {
            state.editor.insert_char(c);
            changed = true;
        }
        _ => {}
    }

    if changed {
        state.commit_editor();
    }
    let height = state.editor_view_height();
    state.editor.scroll_to_cursor(height);
    Ok(())
}

fn handle_paste(text: &str, state: &mut AppState) {
    if state.load_prompt_active {
        state.load_prompt_input.push_str(text.trim());
        return;
    }
    match state.editing {
        Some(EditTarget::Source) => {
            state.editor.insert_str(text);
            state.commit_editor();
            let height = state.editor_view_height();
            state.editor.scroll_to_cursor(height);
        }
        Some(EditTarget::Prompt | EditTarget::Font) => {
            state.field_buffer.insert_str(&text.replace(['\r', '\n'], " "));
        }
        None => {}
    }
}

/// Handle input for the input form
fn handle_form_input(key: KeyEvent, state: &mut AppState) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => state.selected_field = state.selected_field.prev(),
        KeyCode::Down | KeyCode::Char('j') => state.selected_field = state.selected_field.next(),

        KeyCode::Enter | KeyCode::Char('e') | KeyCode::Char('E') => match state.selected_field {
            FormField::Prompt => state.begin_edit(EditTarget::Prompt),
            FormField::Font => state.begin_edit(EditTarget::Font),
            FormField::Image => state.start_load_prompt(),
            FormField::Format => state.toggle_format(),
        },

        // Format row accepts direct selection
        KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')
            if state.selected_field == FormField::Format =>
        {
            state.toggle_format()
        }
        KeyCode::Char('1') => select_format(state, OutputFormat::Html),
        KeyCode::Char('2') => select_format(state, OutputFormat::Jsx),

        KeyCode::Delete if state.selected_field == FormField::Image => {
            state.session.clear_image();
            state.set_status("Image cleared", false);
        }
        _ => {}
    }
}

fn select_format(state: &mut AppState, format: OutputFormat) {
    if state.session.format() != format {
        state.toggle_format();
    }
}

/// Handle input for the editor pane outside of edit mode
fn handle_editor_input(key: KeyEvent, state: &mut AppState) {
    let height = state.editor_view_height();
    match key.code {
        KeyCode::Enter | KeyCode::Char('e') | KeyCode::Char('E') | KeyCode::Char('i') => {
            state.begin_edit(EditTarget::Source)
        }
        KeyCode::Up | KeyCode::Char('k') => state.editor.move_up(),
        KeyCode::Down | KeyCode::Char('j') => state.editor.move_down(),
        KeyCode::PageUp => (0..height).for_each(|_| state.editor.move_up()),
        KeyCode::PageDown => (0..height).for_each(|_| state.editor.move_down()),
        _ => {}
    }
    state.editor.scroll_to_cursor(height);
}

/// Handle input for preview widget
fn handle_preview_input(key: KeyEvent, state: &mut AppState) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => state.scroll_up(1),
        KeyCode::Down | KeyCode::Char('j') => state.scroll_down(1),
        KeyCode::PageUp => state.scroll_up(10),
        KeyCode::PageDown => state.scroll_down(10),
        KeyCode::Home => state.preview_scroll = 0,
        KeyCode::End => {
            let line_count = state.session.preview().lines().len();
            state.preview_scroll = line_count.saturating_sub(1);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::terminal_capabilities::TerminalCapabilities;
    use crossbeam_channel::unbounded;

    fn press(state: &mut AppState, code: KeyCode) {
        handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)), state).unwrap();
    }

    fn type_str(state: &mut AppState, text: &str) {
        for c in text.chars() {
            press(state, KeyCode::Char(c));
        }
    }

    fn app() -> AppState {
        let (tx, _rx) = unbounded();
        AppState::new(Config::default(), TerminalCapabilities::default(), tx)
    }

    #[test]
    fn test_quit_and_help() {
        let mut state = app();
        press(&mut state, KeyCode::Char('?'));
        assert!(state.show_help);
        press(&mut state, KeyCode::Char('q'));
        assert!(!state.should_quit);
        press(&mut state, KeyCode::Esc);
        press(&mut state, KeyCode::Char('q'));
        assert!(state.should_quit);
    }

    #[test]
    fn test_typing_prompt_does_not_trigger_shortcuts() {
        let mut state = app();
        press(&mut state, KeyCode::Enter);
        assert_eq!(state.editing, Some(EditTarget::Prompt));
        type_str(&mut state, "a quiet green page");
        press(&mut state, KeyCode::Enter);

        assert_eq!(state.editing, None);
        assert!(!state.should_quit);
        assert_eq!(state.session.inputs().prompt(), "a quiet green page");
    }

    #[test]
    fn test_format_row_toggles() {
        let mut state = app();
        press(&mut state, KeyCode::Down);
        press(&mut state, KeyCode::Down);
        press(&mut state, KeyCode::Down);
        assert_eq!(state.selected_field, FormField::Format);
        press(&mut state, KeyCode::Right);
        assert_eq!(state.session.format(), OutputFormat::Jsx);
        press(&mut state, KeyCode::Char('1'));
        assert_eq!(state.session.format(), OutputFormat::Html);
    }

    #[test]
    fn test_source_editing_updates_working_copy_only() {
        let mut state = app();
        state.focus = FocusedWidget::Editor;
        press(&mut state, KeyCode::Enter);
        assert_eq!(state.editing, Some(EditTarget::Source));

        type_str(&mut state, "<b>q</b>");
        assert_eq!(state.session.working_copy(), "<b>q</b>");
        assert_eq!(state.session.canonical(), "");

        handle_event(
            Event::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL)),
            &mut state,
        )
        .unwrap();
        assert_eq!(state.session.canonical(), "<b>q</b>");

        press(&mut state, KeyCode::Esc);
        assert_eq!(state.editing, None);
    }

    #[test]
    fn test_paste_into_load_prompt() {
        let mut state = app();
        press(&mut state, KeyCode::Char('l'));
        handle_event(Event::Paste("  /tmp/shoe.png\n".to_string()), &mut state).unwrap();
        assert_eq!(state.load_prompt_input, "/tmp/shoe.png");
    }
}
