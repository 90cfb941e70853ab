//! Saving exported artifacts
//!
//! A download is staged in a hidden temporary file next to its destination
//! and moved into place once fully written. The staging file is deleted on
//! every path that does not end in a completed download, and the final move
//! never replaces an existing file.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::{NamedTempFile, PersistError};

use crate::artifact::ExportArtifact;

/// Upper bound on `name (n).ext` attempts before giving up
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Write `bytes` to a hidden temporary file in `dir`
pub fn stage(dir: &Path, stem: &str, bytes: &[u8]) -> Result<NamedTempFile> {
    let mut staged = tempfile::Builder::new()
        .prefix(&format!(".{stem}."))
        .suffix(".part")
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create staging file in {:?}", dir))?;

    staged
        .write_all(bytes)
        .and_then(|_| staged.as_file().sync_all())
        .with_context(|| format!("Failed to write {:?}", staged.path()))?;
    Ok(staged)
}

/// Candidate name for attempt `n`, numbering like a browser would:
/// `generated-ui.html`, `generated-ui (1).html`, ...
fn numbered_name(file_name: &str, n: u32) -> String {
    if n == 0 {
        return file_name.to_string();
    }
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem} ({n}).{ext}"),
        _ => format!("{file_name} ({n})"),
    }
}

/// Move a staged file into `dir` under the first free variant of `file_name`
pub fn persist_unique(mut staged: NamedTempFile, dir: &Path, file_name: &str) -> Result<PathBuf> {
    for n in 0..=MAX_NAME_ATTEMPTS {
        let candidate = dir.join(numbered_name(file_name, n));
        match staged.persist_noclobber(&candidate) {
            Ok(_) => return Ok(candidate),
            Err(PersistError { error, file }) if error.kind() == ErrorKind::AlreadyExists => {
                staged = file;
            }
            Err(PersistError { error, .. }) => {
                return Err(error).with_context(|| format!("Failed to move download to {:?}", candidate));
            }
        }
    }
    anyhow::bail!("No free file name for {file_name} in {:?}", dir)
}

/// Write an artifact into `dir` under its suggested name
pub fn save_artifact(artifact: &ExportArtifact, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create export directory {:?}", dir))?;

    let stem = artifact
        .file_name
        .rsplit_once('.')
        .map_or(artifact.file_name.as_str(), |(stem, _)| stem);
    let staged = stage(dir, stem, &artifact.bytes)?;
    let saved = persist_unique(staged, dir, &artifact.file_name)?;

    tracing::info!(
        path = ?saved,
        media_type = %artifact.media_type,
        bytes = artifact.bytes.len(),
        "artifact saved"
    );
    Ok(saved)
}

/// Copy text to the system clipboard
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("Clipboard unavailable")?;
    clipboard.set_text(text.to_string()).context("Copy failed")?;
    Ok(())
}
