//! Generation session
//!
//! Single owner of inputs, request lifecycle, artifacts and preview. Every
//! mutation goes through a method here, and the preview is re-synced after
//! each one so it always shows canonical source.

use tracing::{debug, info, warn};

use crate::artifact::{ArtifactStore, ExportArtifact, ExportKind, SourceRetention};
use crate::error::{GenerationError, SessionError, SessionResult};
use crate::inputs::{ImageUpload, InputCollector, OutputFormat};
use crate::orchestrator::{Orchestrator, SessionPhase, SubmissionId};
use crate::preview::PreviewRenderer;
use crate::service::{GenerationRequest, GenerationResponse, GenerationService};

/// What happened to a completion handed to [`Session::complete_submit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The result replaced the session's artifacts
    Published,
    /// Not the pending submission; ignored
    Stale,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub default_font: String,
    pub default_format: OutputFormat,
    pub retention: SourceRetention,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            default_font: "Roboto".to_string(),
            default_format: OutputFormat::Html,
            retention: SourceRetention::PerFormat,
        }
    }
}

#[derive(Debug)]
pub struct Session {
    inputs: InputCollector,
    orchestrator: Orchestrator,
    store: ArtifactStore,
    preview: PreviewRenderer,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

impl Session {
    pub fn new(options: SessionOptions) -> Self {
        let mut session = Self {
            inputs: InputCollector::new(options.default_font, options.default_format),
            orchestrator: Orchestrator::new(),
            store: ArtifactStore::new(options.default_format, options.retention),
            preview: PreviewRenderer::new(),
        };
        session.sync_preview();
        session
    }

    // --- inputs ---

    pub fn inputs(&self) -> &InputCollector {
        &self.inputs
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.inputs.set_prompt(prompt);
    }

    pub fn set_font(&mut self, font: impl Into<String>) {
        self.inputs.set_font(font);
    }

    pub fn set_image(&mut self, image: ImageUpload) {
        self.inputs.set_image(image);
    }

    pub fn clear_image(&mut self) {
        self.inputs.clear_image();
    }

    /// Switch the active format for both the next request and the artifacts
    pub fn set_format(&mut self, format: OutputFormat) {
        self.inputs.set_format(format);
        self.store.set_format(format);
        self.sync_preview();
    }

    pub fn format(&self) -> OutputFormat {
        self.store.format()
    }

    // --- request lifecycle ---

    pub fn phase(&self) -> SessionPhase {
        self.orchestrator.phase()
    }

    pub fn is_submitting(&self) -> bool {
        self.orchestrator.is_submitting()
    }

    /// Validate inputs and mark a request as in flight. The caller must
    /// eventually pass the id to [`Session::complete_submit`] or
    /// [`Session::abandon_submit`].
    pub fn begin_submit(&mut self) -> SessionResult<(SubmissionId, GenerationRequest)> {
        match self.orchestrator.begin(&self.inputs) {
            Ok((id, request)) => {
                info!(submission = %id, format = %request.format, "generation submitted");
                Ok((id, request))
            }
            Err(err) => {
                warn!(error = %err, "submission rejected");
                Err(err)
            }
        }
    }

    /// Resolve a submission. On failure the artifacts are left exactly as
    /// they were before the request.
    pub fn complete_submit(
        &mut self,
        id: SubmissionId,
        outcome: Result<GenerationResponse, GenerationError>,
    ) -> SessionResult<Completion> {
        match self.orchestrator.finish(id, outcome) {
            None => {
                debug!(submission = %id, "ignoring stale completion");
                Ok(Completion::Stale)
            }
            Some(Ok(result)) => {
                info!(
                    submission = %id,
                    format = %result.format,
                    source_len = result.source().len(),
                    colors = result.palette.len(),
                    "generation result published"
                );
                self.store.publish(result);
                self.sync_preview();
                Ok(Completion::Published)
            }
            Some(Err(err)) => {
                warn!(submission = %id, error = %err, "generation failed");
                Err(SessionError::GenerationFailed(err))
            }
        }
    }

    /// Release the in-flight state without a result
    pub fn abandon_submit(&mut self, id: SubmissionId) {
        debug!(submission = %id, "submission abandoned");
        self.orchestrator.abandon(id);
    }

    /// Submit and wait for the service in one call.
    ///
    /// The in-flight state is released when this returns, and also if the
    /// returned future is dropped before completion.
    pub async fn submit<S>(&mut self, service: &S) -> SessionResult<()>
    where
        S: GenerationService + ?Sized,
    {
        let (id, request) = self.begin_submit()?;
        let guard = InFlight {
            session: self,
            id: Some(id),
        };
        let outcome = service.generate(&request).await;
        drop(request);
        guard.complete(outcome).map(|_| ())
    }

    // --- artifacts ---

    pub fn canonical(&self) -> &str {
        self.store.canonical()
    }

    pub fn working_copy(&self) -> &str {
        self.store.working_copy()
    }

    pub fn palette(&self) -> &[String] {
        self.store.palette()
    }

    pub fn has_unapplied_edits(&self) -> bool {
        self.store.has_unapplied_edits()
    }

    pub fn edit(&mut self, text: impl Into<String>) {
        self.store.edit(text);
    }

    pub fn apply(&mut self) {
        self.store.apply();
        if self.sync_preview() {
            debug!(revision = self.store.canonical_revision(), "edits applied to preview");
        }
    }

    pub fn export(&self, kind: ExportKind) -> ExportArtifact {
        self.store.export(kind)
    }

    /// Export for the active format
    pub fn export_primary(&self) -> ExportArtifact {
        self.store.export(ExportKind::primary(self.store.format()))
    }

    // --- preview ---

    pub fn preview(&self) -> &PreviewRenderer {
        &self.preview
    }

    fn sync_preview(&mut self) -> bool {
        self.preview.sync(
            self.store.canonical_revision(),
            self.store.canonical(),
            self.store.palette(),
        )
    }
}

/// Releases the in-flight state if the submit future is dropped early
struct InFlight<'a> {
    session: &'a mut Session,
    id: Option<SubmissionId>,
}

impl InFlight<'_> {
    fn complete(mut self, outcome: Result<GenerationResponse, GenerationError>) -> SessionResult<Completion> {
        match self.id.take() {
            Some(id) => self.session.complete_submit(id, outcome),
            None => Ok(Completion::Stale),
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.session.abandon_submit(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn ready_session(format: OutputFormat) -> Session {
        let mut session = Session::default();
        session.set_prompt("A clean product card with CTA");
        session.set_image(ImageUpload::new("shoe.png", "image/png", vec![1u8, 2, 3]));
        session.set_format(format);
        session
    }

    fn html_response(html: &str, colors: &[&str]) -> GenerationResponse {
        let mut code = BTreeMap::new();
        code.insert(OutputFormat::Html, html.to_string());
        GenerationResponse {
            code,
            colors: colors.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn test_new_session_is_idle_and_empty() {
        let session = Session::default();
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.canonical(), "");
        assert_eq!(session.preview().source(), "");
        assert_eq!(session.inputs().font(), "Roboto");
    }

    #[test]
    fn test_complete_submit_publishes() {
        let mut session = ready_session(OutputFormat::Html);
        let (id, _) = session.begin_submit().unwrap();
        let completion = session
            .complete_submit(id, Ok(html_response("<div>X</div>", &["#fff", "#000"])))
            .unwrap();

        assert_eq!(completion, Completion::Published);
        assert_eq!(session.phase(), SessionPhase::Ready);
        assert_eq!(session.canonical(), "<div>X</div>");
        assert_eq!(session.working_copy(), "<div>X</div>");
        assert_eq!(session.palette(), ["#fff", "#000"]);
        assert_eq!(session.preview().source(), "<div>X</div>");
    }

    #[test]
    fn test_format_switch_during_flight_updates_target_only_for_next_request() {
        let mut session = ready_session(OutputFormat::Html);
        let (id, request) = session.begin_submit().unwrap();
        assert_eq!(request.format, OutputFormat::Html);

        session.set_format(OutputFormat::Jsx);
        session.complete_submit(id, Ok(html_response("<p/>", &[]))).unwrap();

        assert_eq!(session.format(), OutputFormat::Jsx);
        assert_eq!(session.canonical(), "");
        session.set_format(OutputFormat::Html);
        assert_eq!(session.canonical(), "<p/>");
    }

    #[test]
    fn test_apply_updates_preview() {
        let mut session = ready_session(OutputFormat::Html);
        let (id, _) = session.begin_submit().unwrap();
        session.complete_submit(id, Ok(html_response("<p>old</p>", &[]))).unwrap();

        session.edit("new text");
        assert_eq!(session.preview().source(), "<p>old</p>");

        session.apply();
        assert_eq!(session.preview().source(), "new text");
        assert_eq!(session.phase(), SessionPhase::Ready);
    }

    #[test]
    fn test_abandon_releases_flight() {
        let mut session = ready_session(OutputFormat::Html);
        let (id, _) = session.begin_submit().unwrap();
        session.abandon_submit(id);
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.begin_submit().is_ok());
    }
}
