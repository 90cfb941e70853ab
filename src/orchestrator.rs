//! Request orchestration
//!
//! Tracks the submission lifecycle as an explicit phase machine:
//!
//! ```text
//! Idle --submit--> Submitting --ok--> Ready
//!                      |
//!                      +--err--> phase before submit (Idle or Ready)
//! ```
//!
//! `Submitting` rejects further submissions. Each accepted submission gets a
//! [`SubmissionId`] so a late or duplicate completion can be told apart from
//! the one the session is waiting for.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{GenerationError, SessionError, SessionResult};
use crate::inputs::{ImageUpload, InputCollector, OutputFormat};
use crate::service::{GenerationRequest, GenerationResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Submitting,
    Ready,
}

impl SessionPhase {
    pub fn name(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "Idle",
            SessionPhase::Submitting => "Generating...",
            SessionPhase::Ready => "Ready",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionId(u64);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Normalized output of one successful request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    /// Format the request was made for
    pub format: OutputFormat,
    pub source_by_format: BTreeMap<OutputFormat, String>,
    pub palette: Vec<String>,
}

impl GenerationResult {
    pub fn normalize(format: OutputFormat, response: GenerationResponse) -> Self {
        Self {
            format,
            source_by_format: response.code,
            palette: response.colors,
        }
    }

    /// Source for the requested format, empty when the service omitted it
    pub fn source(&self) -> &str {
        self.source_by_format
            .get(&self.format)
            .map_or("", String::as_str)
    }
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    id: SubmissionId,
    format: OutputFormat,
    /// Phase to fall back to if the request fails
    resume: SessionPhase,
}

#[derive(Debug, Default)]
pub struct Orchestrator {
    phase: SessionPhase,
    pending: Option<Pending>,
    next_id: u64,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == SessionPhase::Submitting
    }

    pub fn pending_id(&self) -> Option<SubmissionId> {
        self.pending.map(|p| p.id)
    }

    /// Validate inputs and move to `Submitting`.
    ///
    /// On error nothing changes.
    pub fn begin(&mut self, inputs: &InputCollector) -> SessionResult<(SubmissionId, GenerationRequest)> {
        if self.is_submitting() {
            return Err(SessionError::RequestInFlight);
        }

        let missing = inputs.missing_fields();
        if !missing.is_empty() {
            return Err(SessionError::MissingInput(missing));
        }

        let image: ImageUpload = match inputs.image() {
            Some(image) => image.clone(),
            None => return Err(SessionError::MissingInput(missing)),
        };

        let request = GenerationRequest {
            prompt: inputs.prompt().to_string(),
            font: inputs.font().to_string(),
            image,
            format: inputs.format(),
        };

        self.next_id += 1;
        let id = SubmissionId(self.next_id);
        self.pending = Some(Pending {
            id,
            format: request.format,
            resume: self.phase,
        });
        self.phase = SessionPhase::Submitting;

        Ok((id, request))
    }

    /// Resolve the pending submission.
    ///
    /// Returns `None` when `id` is not the pending submission; the outcome is
    /// dropped and the phase is left alone.
    pub fn finish(
        &mut self,
        id: SubmissionId,
        outcome: Result<GenerationResponse, GenerationError>,
    ) -> Option<Result<GenerationResult, GenerationError>> {
        let pending = self.take_pending(id)?;

        match outcome {
            Ok(response) => {
                self.phase = SessionPhase::Ready;
                Some(Ok(GenerationResult::normalize(pending.format, response)))
            }
            Err(err) => {
                self.phase = pending.resume;
                Some(Err(err))
            }
        }
    }

    /// Release the in-flight state without a result
    pub fn abandon(&mut self, id: SubmissionId) {
        if let Some(pending) = self.take_pending(id) {
            self.phase = pending.resume;
        }
    }

    fn take_pending(&mut self, id: SubmissionId) -> Option<Pending> {
        match self.pending {
            Some(pending) if pending.id == id => self.pending.take(),
            _ => None,
        }
    }
}
