//! Artifact store
//!
//! Holds the canonical source (what the preview shows), the user's working
//! copy, the active format and the palette. Edits only touch the working
//! copy; `apply` is the single path from edits to canonical.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::inputs::OutputFormat;
use crate::orchestrator::GenerationResult;

/// How fetched sources are kept across format switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceRetention {
    /// Keep every format the service returned, each with its own working copy
    #[default]
    PerFormat,
    /// Keep only the requested format; switching format drops it
    ActiveOnly,
}

/// Canonical/working pair for one format
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FormatSlot {
    canonical: String,
    working: String,
}

/// What the user wants to download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Html,
    Jsx,
    /// Platform-specific JSX variant
    Shopify,
}

impl ExportKind {
    /// Primary export for the active format
    pub fn primary(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Html => ExportKind::Html,
            OutputFormat::Jsx => ExportKind::Jsx,
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ExportKind::Html => "generated-ui.html",
            ExportKind::Jsx => "generated-ui.jsx",
            ExportKind::Shopify => "generated-shopify.jsx",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            ExportKind::Html => "text/html",
            ExportKind::Jsx | ExportKind::Shopify => "text/javascript",
        }
    }
}

/// Transient downloadable object produced by [`ArtifactStore::export`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStore {
    slots: BTreeMap<OutputFormat, FormatSlot>,
    format: OutputFormat,
    palette: Vec<String>,
    retention: SourceRetention,
    canonical_revision: u64,
}

impl ArtifactStore {
    pub fn new(format: OutputFormat, retention: SourceRetention) -> Self {
        Self {
            slots: BTreeMap::new(),
            format,
            palette: Vec::new(),
            retention,
            canonical_revision: 0,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn retention(&self) -> SourceRetention {
        self.retention
    }

    /// Text currently shown in the preview
    pub fn canonical(&self) -> &str {
        self.slots
            .get(&self.format)
            .map_or("", |slot| slot.canonical.as_str())
    }

    pub fn working_copy(&self) -> &str {
        self.slots
            .get(&self.format)
            .map_or("", |slot| slot.working.as_str())
    }

    pub fn palette(&self) -> &[String] {
        &self.palette
    }

    /// Bumped every time the canonical text of the active format changes
    pub fn canonical_revision(&self) -> u64 {
        self.canonical_revision
    }

    /// True when the working copy differs from canonical
    pub fn has_unapplied_edits(&self) -> bool {
        self.working_copy() != self.canonical()
    }

    /// Replace all sources and the palette with a fresh result
    pub fn publish(&mut self, result: GenerationResult) {
        let GenerationResult {
            format: requested,
            source_by_format,
            palette,
        } = result;

        self.slots.clear();
        for (format, source) in source_by_format {
            if self.retention == SourceRetention::ActiveOnly && format != requested {
                continue;
            }
            self.slots.insert(
                format,
                FormatSlot {
                    canonical: source.clone(),
                    working: source,
                },
            );
        }
        self.slots.entry(requested).or_default();
        self.palette = palette;

        // a fresh result always re-renders, even if the text is identical
        self.canonical_revision += 1;
    }

    pub fn set_format(&mut self, format: OutputFormat) {
        if format == self.format {
            return;
        }
        let before = self.canonical().to_string();

        if self.retention == SourceRetention::ActiveOnly {
            self.slots.clear();
        }
        self.format = format;

        if self.canonical() != before {
            self.canonical_revision += 1;
        }
    }

    /// Replace the working copy. Canonical and preview are unaffected.
    pub fn edit(&mut self, text: impl Into<String>) {
        self.slots.entry(self.format).or_default().working = text.into();
    }

    /// Promote the working copy to canonical
    pub fn apply(&mut self) {
        let slot = self.slots.entry(self.format).or_default();
        if slot.canonical != slot.working {
            slot.canonical = slot.working.clone();
            self.canonical_revision += 1;
        }
    }

    /// Build a downloadable artifact from the working copy without mutating anything
    pub fn export(&self, kind: ExportKind) -> ExportArtifact {
        ExportArtifact {
            file_name: kind.file_name().to_string(),
            media_type: kind.media_type().to_string(),
            bytes: self.working_copy().as_bytes().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(format: OutputFormat, html: Option<&str>, jsx: Option<&str>, colors: &[&str]) -> GenerationResult {
        let mut source_by_format = BTreeMap::new();
        if let Some(html) = html {
            source_by_format.insert(OutputFormat::Html, html.to_string());
        }
        if let Some(jsx) = jsx {
            source_by_format.insert(OutputFormat::Jsx, jsx.to_string());
        }
        GenerationResult {
            format,
            source_by_format,
            palette: colors.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn test_publish_replaces_canonical_working_and_palette() {
        let mut store = ArtifactStore::new(OutputFormat::Html, SourceRetention::PerFormat);
        store.publish(result(OutputFormat::Html, Some("<div>X</div>"), None, &["#fff", "#000"]));

        assert_eq!(store.canonical(), "<div>X</div>");
        assert_eq!(store.working_copy(), "<div>X</div>");
        assert_eq!(store.palette(), ["#fff", "#000"]);
        assert_eq!(store.canonical_revision(), 1);
    }

    #[test]
    fn test_missing_format_becomes_empty_text() {
        let mut store = ArtifactStore::new(OutputFormat::Jsx, SourceRetention::PerFormat);
        store.publish(result(OutputFormat::Jsx, Some("<p>html only</p>"), None, &[]));
        assert_eq!(store.canonical(), "");
        assert_eq!(store.working_copy(), "");
    }

    #[test]
    fn test_edit_does_not_touch_canonical() {
        let mut store = ArtifactStore::new(OutputFormat::Html, SourceRetention::PerFormat);
        store.publish(result(OutputFormat::Html, Some("<b>old</b>"), None, &[]));
        let revision = store.canonical_revision();

        store.edit("new text");
        assert_eq!(store.working_copy(), "new text");
        assert_eq!(store.canonical(), "<b>old</b>");
        assert_eq!(store.canonical_revision(), revision);
        assert!(store.has_unapplied_edits());
    }

    #[test]
    fn test_apply_promotes_and_is_idempotent() {
        let mut store = ArtifactStore::new(OutputFormat::Html, SourceRetention::PerFormat);
        store.edit("new text");
        store.apply();
        let once = store.clone();
        store.apply();

        assert_eq!(store.canonical(), "new text");
        assert_eq!(store, once);
        assert!(!store.has_unapplied_edits());
    }

    #[test]
    fn test_per_format_retention_keeps_both_sources() {
        let mut store = ArtifactStore::new(OutputFormat::Html, SourceRetention::PerFormat);
        store.publish(result(OutputFormat::Html, Some("<div/>"), Some("<Div />"), &[]));
        store.edit("<div>edited</div>");

        store.set_format(OutputFormat::Jsx);
        assert_eq!(store.canonical(), "<Div />");

        store.set_format(OutputFormat::Html);
        assert_eq!(store.canonical(), "<div/>");
        assert_eq!(store.working_copy(), "<div>edited</div>");
    }

    #[test]
    fn test_active_only_retention_discards_on_switch() {
        let mut store = ArtifactStore::new(OutputFormat::Html, SourceRetention::ActiveOnly);
        store.publish(result(OutputFormat::Html, Some("<div/>"), Some("<Div />"), &[]));

        store.set_format(OutputFormat::Jsx);
        assert_eq!(store.canonical(), "");

        store.set_format(OutputFormat::Html);
        assert_eq!(store.canonical(), "");
    }

    #[test]
    fn test_format_switch_bumps_revision_only_on_change() {
        let mut store = ArtifactStore::new(OutputFormat::Html, SourceRetention::PerFormat);
        store.publish(result(OutputFormat::Html, Some("same"), Some("same"), &[]));
        let revision = store.canonical_revision();

        store.set_format(OutputFormat::Jsx);
        assert_eq!(store.canonical_revision(), revision);

        store.edit("changed");
        store.apply();
        store.set_format(OutputFormat::Html);
        assert_eq!(store.canonical_revision(), revision + 2);
    }

    #[test]
    fn test_export_reads_working_copy() {
        let mut store = ArtifactStore::new(OutputFormat::Jsx, SourceRetention::PerFormat);
        store.publish(result(OutputFormat::Jsx, None, Some("<A />"), &[]));
        store.edit("<B />");
        let before = store.clone();

        let primary = store.export(ExportKind::primary(store.format()));
        assert_eq!(primary.file_name, "generated-ui.jsx");
        assert_eq!(primary.media_type, "text/javascript");
        assert_eq!(primary.bytes, b"<B />");

        let shopify = store.export(ExportKind::Shopify);
        assert_eq!(shopify.file_name, "generated-shopify.jsx");
        assert_eq!(shopify.bytes, b"<B />");

        assert_eq!(store, before);
    }

    #[test]
    fn test_export_empty_working_copy() {
        let store = ArtifactStore::new(OutputFormat::Html, SourceRetention::PerFormat);
        let artifact = store.export(ExportKind::Html);
        assert_eq!(artifact.file_name, "generated-ui.html");
        assert_eq!(artifact.media_type, "text/html");
        assert!(artifact.bytes.is_empty());
    }
}
