//! Generation service client
//!
//! The remote service is a black box that takes a prompt, a font, a product
//! image and a target format, and answers with generated source code plus a
//! brand palette. [`GenerationService`] is the seam; [`HttpGenerationService`]
//! speaks the multipart/JSON protocol over reqwest.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;

use crate::error::GenerationError;
use crate::inputs::{ImageUpload, OutputFormat};

/// Default endpoint of a locally running generation service
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/generate";

/// One submission attempt. Built fresh for every submit and dropped after use.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub font: String,
    pub image: ImageUpload,
    pub format: OutputFormat,
}

/// Decoded service response, before normalization into session state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResponse {
    /// Source text keyed by format; formats the service did not return are absent
    pub code: BTreeMap<OutputFormat, String>,
    pub colors: Vec<String>,
}

impl GenerationResponse {
    /// Decode a response body.
    ///
    /// Anything that parses as JSON is accepted: absent or wrongly typed
    /// fields fall back to empty values and unknown `code` keys are ignored.
    /// An object with an `error` string and no `code` object is reported as a
    /// service failure.
    pub fn from_json_bytes(body: &[u8]) -> Result<Self, GenerationError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| GenerationError::Malformed(e.to_string()))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, GenerationError> {
        let code_obj = value.get("code").and_then(Value::as_object);

        if code_obj.is_none() {
            if let Some(message) = value.get("error").and_then(Value::as_str) {
                return Err(GenerationError::Service(message.to_string()));
            }
        }

        let mut code = BTreeMap::new();
        if let Some(obj) = code_obj {
            for format in OutputFormat::all() {
                if let Some(source) = obj.get(format.as_str()).and_then(Value::as_str) {
                    code.insert(*format, source.to_string());
                }
            }
        }

        let colors = value
            .get("colors")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self { code, colors })
    }
}

/// Anything that can turn a [`GenerationRequest`] into a [`GenerationResponse`]
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, GenerationError>;
}

/// Multipart HTTP client for the generation endpoint
#[derive(Debug, Clone)]
pub struct HttpGenerationService {
    client: Client,
    endpoint: String,
}

impl HttpGenerationService {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Client with a request timeout. Without one a hung request keeps the
    /// session submitting indefinitely.
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_form(request: &GenerationRequest) -> Result<Form, GenerationError> {
        let image = Part::bytes(request.image.bytes.to_vec())
            .file_name(request.image.file_name.clone())
            .mime_str(&request.image.mime_type)?;

        Ok(Form::new()
            .text("prompt", request.prompt.clone())
            .text("font", request.font.clone())
            .part("image", image)
            .text("format", request.format.as_str()))
    }
}

#[async_trait]
impl GenerationService for HttpGenerationService {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, GenerationError> {
        let form = Self::build_form(request)?;

        tracing::debug!(
            endpoint = %self.endpoint,
            format = %request.format,
            image_bytes = request.image.bytes.len(),
            "sending generation request"
        );

        let response = self.client.post(&self.endpoint).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Status(
                status,
                response.text().await.unwrap_or_default(),
            ));
        }

        let body = response.bytes().await?;
        GenerationResponse::from_json_bytes(&body)
    }
}
