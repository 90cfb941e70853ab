//! uigen - terminal client for a multimodal UI generation service
//!
//! Collects a prompt, a font and a product image, sends them to a generation
//! service, and manages the returned HTML/JSX source: an editable working
//! copy, a canonical copy shown in a live preview, and file exports.

pub mod artifact;
pub mod color_space;
pub mod config;
pub mod download;
pub mod editor;
pub mod error;
pub mod image_loader;
pub mod input;
pub mod inputs;
pub mod orchestrator;
pub mod preview;
pub mod service;
pub mod session;
pub mod state;
pub mod terminal_capabilities;
pub mod ui;
pub mod unicode_handler;
pub mod worker;

// Re-export commonly used types
pub use artifact::{ExportArtifact, ExportKind, SourceRetention};
pub use config::Config;
pub use error::{GenerationError, SessionError};
pub use inputs::{ImageUpload, OutputFormat};
pub use service::{GenerationService, HttpGenerationService};
pub use session::{Session, SessionOptions};
pub use state::AppState;
