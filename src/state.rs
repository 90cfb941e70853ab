//! Application state management
//!
//! Wraps the generation [`Session`] with everything the terminal front end
//! needs: focus, in-progress field edits, the load prompt, status line and
//! the channel to the generation worker.

use std::path::PathBuf;

use crossbeam_channel::Sender;

use crate::artifact::{ExportArtifact, ExportKind};
use crate::config::Config;
use crate::download;
use crate::editor::TextBuffer;
use crate::error::{GenerationError, SessionError};
use crate::session::{Completion, Session};
use crate::terminal_capabilities::TerminalCapabilities;
use crate::worker::{WorkerMessage, WorkerResponse};

/// File name suggested for the standalone sandboxed preview page
pub const PREVIEW_PAGE_NAME: &str = "generated-ui-preview.html";

/// Which widget is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusedWidget {
    #[default]
    Form,
    Editor,
    Preview,
}

impl FocusedWidget {
    pub fn next(&self) -> Self {
        match self {
            FocusedWidget::Form => FocusedWidget::Editor,
            FocusedWidget::Editor => FocusedWidget::Preview,
            FocusedWidget::Preview => FocusedWidget::Form,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FocusedWidget::Form => FocusedWidget::Preview,
            FocusedWidget::Editor => FocusedWidget::Form,
            FocusedWidget::Preview => FocusedWidget::Editor,
        }
    }
}

/// Rows of the input form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Prompt,
    Font,
    Image,
    Format,
}

impl FormField {
    pub fn all() -> &'static [FormField] {
        &[
            FormField::Prompt,
            FormField::Font,
            FormField::Image,
            FormField::Format,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            FormField::Prompt => "Prompt",
            FormField::Font => "Font",
            FormField::Image => "Image",
            FormField::Format => "Format",
        }
    }

    pub fn next(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|f| f == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn prev(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|f| f == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }
}

/// What the keyboard is currently typing into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Prompt,
    Font,
    /// The working copy in the editor pane
    Source,
}

/// Main application state
pub struct AppState {
    pub session: Session,

    // Navigation
    pub focus: FocusedWidget,
    pub selected_field: FormField,
    pub show_help: bool,
    pub should_quit: bool,

    // Editing
    pub editing: Option<EditTarget>,
    pub field_buffer: TextBuffer,
    pub editor: TextBuffer,

    // Interactive load prompt (when pressing [L])
    pub load_prompt_active: bool,
    pub load_prompt_input: String,
    pub load_prompt_error: Option<String>,

    // Status
    pub status_message: String,
    pub status_is_error: bool,
    pub spinner_tick: usize,
    pub last_request_ms: Option<u64>,
    pub preview_scroll: usize,

    // Terminal info
    pub terminal_size: (u16, u16),
    pub capabilities: TerminalCapabilities,

    // Configuration
    pub config: Config,

    // Worker communication
    worker_tx: Sender<WorkerMessage>,
}

impl AppState {
    pub fn new(
        config: Config,
        capabilities: TerminalCapabilities,
        worker_tx: Sender<WorkerMessage>,
    ) -> Self {
        let session = Session::new(config.session_options());
        let editor = TextBuffer::new(session.working_copy());

        Self {
            session,
            focus: FocusedWidget::default(),
            selected_field: FormField::default(),
            show_help: false,
            should_quit: false,

            editing: None,
            field_buffer: TextBuffer::default(),
            editor,

            load_prompt_active: false,
            load_prompt_input: String::new(),
            load_prompt_error: None,

            status_message: "Ready - Press [?] for help".to_string(),
            status_is_error: false,
            spinner_tick: 0,
            last_request_ms: None,
            preview_scroll: 0,

            terminal_size: capabilities.size,
            capabilities,
            config,
            worker_tx,
        }
    }

    /// Update terminal size on resize
    pub fn set_terminal_size(&mut self, width: u16, height: u16) {
        self.terminal_size = (width, height);
    }

    /// Set status message
    pub fn set_status(&mut self, message: &str, is_error: bool) {
        self.status_message = message.to_string();
        self.status_is_error = is_error;
    }

    /// Advance the spinner, once per frame
    pub fn tick(&mut self) {
        if self.session.is_submitting() {
            self.spinner_tick = self.spinner_tick.wrapping_add(1);
        }
    }

    // --- generation ---

    /// Validate inputs and hand the request to the worker
    pub fn trigger_generate(&mut self) {
        let (id, request) = match self.session.begin_submit() {
            Ok(accepted) => accepted,
            Err(SessionError::RequestInFlight) => {
                self.set_status("A generation is already running", false);
                return;
            }
            Err(e) => {
                self.set_status(&e.to_string(), true);
                return;
            }
        };

        self.spinner_tick = 0;
        self.set_status("Generating...", false);

        if self.worker_tx.send(WorkerMessage::Generate { id, request }).is_err() {
            tracing::error!(submission = %id, "generation worker is gone");
            if let Err(e) = self
                .session
                .complete_submit(id, Err(GenerationError::WorkerUnavailable))
            {
                self.set_status(&e.to_string(), true);
            }
        }
    }

    /// Handle response from worker thread
    pub fn handle_worker_response(&mut self, response: WorkerResponse) {
        match response {
            WorkerResponse::Generated {
                id,
                outcome,
                elapsed_ms,
            } => match self.session.complete_submit(id, outcome) {
                Ok(Completion::Published) => {
                    self.last_request_ms = Some(elapsed_ms);
                    self.reload_editor();
                    self.preview_scroll = 0;
                    self.set_status(&format!("Generated in {}ms", elapsed_ms), false);
                }
                Ok(Completion::Stale) => {}
                Err(e) => {
                    self.last_request_ms = Some(elapsed_ms);
                    self.set_status(&e.to_string(), true);
                }
            },
        }
    }

    // --- artifacts ---

    /// Flip between HTML and JSX
    pub fn toggle_format(&mut self) {
        let format = self.session.format().toggle();
        self.session.set_format(format);
        self.reload_editor();
        self.preview_scroll = 0;
        self.set_status(&format!("Format: {}", format.name()), false);
    }

    /// Push the working copy to the preview
    pub fn apply_edits(&mut self) {
        if !self.session.has_unapplied_edits() {
            self.set_status("Nothing to apply", false);
            return;
        }
        self.session.apply();
        self.set_status("Applied to preview", false);
    }

    /// Save an export of the working copy to the export directory
    pub fn download(&mut self, kind: ExportKind) {
        let artifact = self.session.export(kind);
        self.save(artifact);
    }

    /// Save the sandboxed preview page next to the exports
    pub fn save_preview_page(&mut self) {
        let artifact = ExportArtifact {
            file_name: PREVIEW_PAGE_NAME.to_string(),
            media_type: "text/html".to_string(),
            bytes: self.session.preview().document().into_bytes(),
        };
        self.save(artifact);
    }

    fn save(&mut self, artifact: ExportArtifact) {
        match download::save_artifact(&artifact, &self.config.export.directory) {
            Ok(path) => self.set_status(&format!("Saved {}", path.display()), false),
            Err(e) => {
                tracing::warn!(file = %artifact.file_name, error = %e, "download failed");
                self.set_status(&format!("Save failed: {:#}", e), true);
            }
        }
    }

    /// Copy the working copy to the clipboard
    pub fn copy_working_copy(&mut self) {
        match download::copy_to_clipboard(self.session.working_copy()) {
            Ok(()) => self.set_status("Copied to clipboard", false),
            Err(e) => self.set_status(&format!("{:#}", e), true),
        }
    }

    // --- editing ---

    /// Start typing into a form field or the editor
    pub fn begin_edit(&mut self, target: EditTarget) {
        match target {
            EditTarget::Prompt => {
                self.field_buffer = at_end(self.session.inputs().prompt());
                self.set_status("Editing prompt: Enter to save, Esc to cancel", false);
            }
            EditTarget::Font => {
                self.field_buffer = at_end(self.session.inputs().font());
                self.set_status("Editing font: Enter to save, Esc to cancel", false);
            }
            EditTarget::Source => {
                self.focus = FocusedWidget::Editor;
                self.set_status("Editing source: Esc to stop, Ctrl+A to apply", false);
            }
        }
        self.editing = Some(target);
    }

    /// Leave edit mode. Field edits are only stored when `commit` is set;
    /// source edits are already in the working copy.
    pub fn end_edit(&mut self, commit: bool) {
        let Some(target) = self.editing.take() else {
            return;
        };
        match target {
            EditTarget::Prompt if commit => {
                self.session.set_prompt(self.field_buffer.text());
                self.set_status("Prompt updated", false);
            }
            EditTarget::Font if commit => {
                self.session.set_font(self.field_buffer.text());
                self.set_status("Font updated", false);
            }
            EditTarget::Prompt | EditTarget::Font => self.set_status("Edit cancelled", false),
            EditTarget::Source => {
                let message = if self.session.has_unapplied_edits() {
                    "Unapplied edits - press [A] to apply"
                } else {
                    "Source unchanged"
                };
                self.set_status(message, false);
            }
        }
    }

    /// Mirror the editor buffer into the session's working copy
    pub fn commit_editor(&mut self) {
        self.session.edit(self.editor.text());
    }

    /// Visible editor rows for the current terminal size
    pub fn editor_view_height(&self) -> usize {
        // title + status bars, then the editor takes half the remaining rows
        let content = self.terminal_size.1.saturating_sub(2) as usize;
        (content / 2).saturating_sub(2).max(1)
    }

    fn reload_editor(&mut self) {
        self.editor.reset(self.session.working_copy());
        self.editor.scroll = 0;
    }

    // --- image loading ---

    /// Start the interactive load prompt (shows a modal for path input)
    pub fn start_load_prompt(&mut self) {
        self.load_prompt_active = true;
        self.load_prompt_input.clear();
        self.load_prompt_error = None;
        self.set_status("Enter image path and press Enter", false);
    }

    /// Cancel the interactive load prompt
    pub fn cancel_load_prompt(&mut self) {
        self.load_prompt_active = false;
        self.load_prompt_input.clear();
        self.load_prompt_error = None;
        self.set_status("Load cancelled", false);
    }

    /// Attempt to load the image from the prompt input
    pub fn submit_load_prompt(&mut self) {
        let input = self.load_prompt_input.trim();
        if input.is_empty() {
            self.load_prompt_error = Some("Path is empty".to_string());
            self.set_status("Path is empty", true);
            return;
        }

        let path = PathBuf::from(input);
        if !path.exists() {
            self.load_prompt_error = Some("File not found".to_string());
            self.set_status("File not found", true);
            return;
        }

        if let Err(e) = self.load_image(path) {
            self.load_prompt_error = Some(format!("Failed to load: {}", e));
            self.set_status(&format!("Failed to load: {}", e), true);
        }
    }

    /// Load an image file as the product image
    pub fn load_image(&mut self, path: PathBuf) -> anyhow::Result<()> {
        let upload = crate::image_loader::load_image(&path)?;
        let message = match upload.dimensions {
            Some((w, h)) => format!("Loaded: {} ({}x{})", upload.file_name, w, h),
            None => format!("Loaded: {}", upload.file_name),
        };
        self.session.set_image(upload);

        self.load_prompt_active = false;
        self.load_prompt_input.clear();
        self.load_prompt_error = None;
        self.set_status(&message, false);
        Ok(())
    }

    // --- preview scrolling ---

    /// Scroll preview up
    pub fn scroll_up(&mut self, amount: usize) {
        self.preview_scroll = self.preview_scroll.saturating_sub(amount);
    }

    /// Scroll preview down
    pub fn scroll_down(&mut self, amount: usize) {
        let line_count = self.session.preview().lines().len();
        self.preview_scroll = (self.preview_scroll + amount).min(line_count.saturating_sub(1));
    }
}

fn at_end(text: &str) -> TextBuffer {
    let mut buffer = TextBuffer::new("");
    buffer.insert_str(text);
    buffer
}
