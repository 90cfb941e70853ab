//! Error taxonomy for the generation session

use thiserror::Error;

use crate::inputs::InputField;

/// Why a generation request did not produce a result
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The request could not be sent or the body could not be read
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service answered with a non-success status code
    #[error("Status error: {1} (Status {0})")]
    Status(reqwest::StatusCode, String),
    /// The response body was not JSON
    #[error("Malformed response: {0}")]
    Malformed(String),
    /// The service reported an error object instead of generated code
    #[error("Service error: {0}")]
    Service(String),
    /// The background worker went away before answering
    #[error("Generation worker unavailable")]
    WorkerUnavailable,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Please fill all inputs (missing: {})", join_fields(.0))]
    MissingInput(Vec<InputField>),
    #[error("A generation request is already in flight")]
    RequestInFlight,
    #[error("Something went wrong. Please try again. ({0})")]
    GenerationFailed(#[from] GenerationError),
}

fn join_fields(fields: &[InputField]) -> String {
    fields
        .iter()
        .map(InputField::name)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type SessionResult<T> = Result<T, SessionError>;
