//! Input collection
//!
//! Holds the values the user has entered so far. Setters replace one field
//! at a time and never validate; validation happens at submit time.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Output representation requested from the generation service
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Html,
    Jsx,
}

impl OutputFormat {
    /// Wire value used in the multipart `format` field and response `code` keys
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Jsx => "jsx",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Html => "HTML",
            OutputFormat::Jsx => "JSX",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            OutputFormat::Html => OutputFormat::Jsx,
            OutputFormat::Jsx => OutputFormat::Html,
        }
    }

    pub fn all() -> &'static [OutputFormat] {
        &[OutputFormat::Html, OutputFormat::Jsx]
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "jsx" => Ok(OutputFormat::Jsx),
            other => Err(format!("unknown format '{other}', expected html or jsx")),
        }
    }
}

/// Product image selected by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
    /// Where the image was loaded from, if it came from disk
    pub source_path: Option<PathBuf>,
    /// Pixel dimensions when the header could be read
    pub dimensions: Option<(u32, u32)>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
            source_path: None,
            dimensions: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A required input that can be missing at submit time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Prompt,
    Font,
    Image,
}

impl InputField {
    pub fn name(&self) -> &'static str {
        match self {
            InputField::Prompt => "prompt",
            InputField::Font => "font",
            InputField::Image => "image",
        }
    }
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Current values of prompt, font, image and target format
#[derive(Debug, Clone, Default)]
pub struct InputCollector {
    prompt: String,
    font: String,
    image: Option<ImageUpload>,
    format: OutputFormat,
}

impl InputCollector {
    pub fn new(default_font: impl Into<String>, default_format: OutputFormat) -> Self {
        Self {
            prompt: String::new(),
            font: default_font.into(),
            image: None,
            format: default_format,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn font(&self) -> &str {
        &self.font
    }

    pub fn image(&self) -> Option<&ImageUpload> {
        self.image.as_ref()
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn set_font(&mut self, font: impl Into<String>) {
        self.font = font.into();
    }

    pub fn set_image(&mut self, image: ImageUpload) {
        self.image = Some(image);
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    pub fn set_format(&mut self, format: OutputFormat) {
        self.format = format;
    }

    /// Required fields that are absent or blank, in form order
    pub fn missing_fields(&self) -> Vec<InputField> {
        let mut missing = Vec::new();
        if self.prompt.trim().is_empty() {
            missing.push(InputField::Prompt);
        }
        if self.font.trim().is_empty() {
            missing.push(InputField::Font);
        }
        if self.image.as_ref().map_or(true, ImageUpload::is_empty) {
            missing.push(InputField::Image);
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png() -> ImageUpload {
        ImageUpload::new("shoe.png", "image/png", vec![1u8, 2, 3])
    }

    #[test]
    fn test_defaults() {
        let inputs = InputCollector::new("Roboto", OutputFormat::Html);
        assert_eq!(inputs.font(), "Roboto");
        assert_eq!(inputs.format(), OutputFormat::Html);
        assert!(inputs.image().is_none());
    }

    #[test]
    fn test_missing_fields_reports_in_order() {
        let mut inputs = InputCollector::new("", OutputFormat::Html);
        assert_eq!(
            inputs.missing_fields(),
            vec![InputField::Prompt, InputField::Font, InputField::Image]
        );

        inputs.set_prompt("A product card");
        inputs.set_font("Inter");
        assert_eq!(inputs.missing_fields(), vec![InputField::Image]);

        inputs.set_image(png());
        assert!(inputs.missing_fields().is_empty());
    }

    #[test]
    fn test_blank_text_counts_as_missing() {
        let mut inputs = InputCollector::new("   ", OutputFormat::Jsx);
        inputs.set_prompt("\t\n");
        inputs.set_image(png());
        assert_eq!(inputs.missing_fields(), vec![InputField::Prompt, InputField::Font]);
    }

    #[test]
    fn test_empty_image_counts_as_missing() {
        let mut inputs = InputCollector::new("Roboto", OutputFormat::Html);
        inputs.set_prompt("card");
        inputs.set_image(ImageUpload::new("empty.png", "image/png", Vec::<u8>::new()));
        assert_eq!(inputs.missing_fields(), vec![InputField::Image]);

        inputs.clear_image();
        assert_eq!(inputs.missing_fields(), vec![InputField::Image]);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("HTML".parse::<OutputFormat>(), Ok(OutputFormat::Html));
        assert_eq!(" jsx ".parse::<OutputFormat>(), Ok(OutputFormat::Jsx));
        assert!("shopify".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Html.toggle(), OutputFormat::Jsx);
    }
}
