//! Provider trait and normalized request/response types.
//!
//! The [`Provider`] trait abstracts over generation services,
//! translating between normalized request/response types and the
//! provider-specific HTTP API. Built-in implementations:
//! [`GeminiProvider`] (real) and [`MockProvider`] (tests).
//!
//! ```text
//! Stage ──► TextRequest ───► Provider::generate_text ────► TextResponse
//!       ──► ImageRequest ──► Provider::generate_images ──► Vec<ImageData>
//! ```

pub mod gemini;
pub mod mock;

pub use gemini::GeminiProvider;
pub use mock::{MockProvider, MockReply};

use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A normalized text-generation request — provider-agnostic.
#[derive(Debug, Clone)]
pub struct TextRequest {
    /// Model identifier (e.g. `"gemini-2.0-flash"`).
    pub model: String,

    /// Optional system instruction framing the model's role.
    pub system_instruction: Option<String>,

    /// The user prompt text.
    pub prompt: String,

    /// When set, the provider is asked for structured JSON output
    /// constrained to this schema (see [`crate::schema::Schema`]).
    pub response_schema: Option<Value>,

    /// Sampling temperature. `None` uses the provider default.
    pub temperature: Option<f64>,

    /// Cap on generated tokens. `None` uses the provider default.
    pub max_output_tokens: Option<u32>,
}

impl TextRequest {
    /// A plain prompt against the given model, no schema or overrides.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_instruction: None,
            prompt: prompt.into(),
            response_schema: None,
            temperature: None,
            max_output_tokens: None,
        }
    }

    /// Set a system instruction.
    pub fn with_system(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Constrain the response to a schema.
    pub fn with_schema(mut self, schema: &crate::schema::Schema) -> Self {
        self.response_schema = Some(schema.to_value());
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Cap the generated token count.
    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }
}

/// A normalized image-generation request.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    /// Model identifier (e.g. `"imagen-3.0-generate-002"`).
    pub model: String,

    /// The image prompt.
    pub prompt: String,

    /// Number of samples to generate.
    pub sample_count: u32,

    /// Aspect ratio understood by the model, e.g. `"1:1"`, `"16:9"`.
    pub aspect_ratio: Option<String>,
}

impl ImageRequest {
    /// A single-sample request against the given model.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            sample_count: 1,
            aspect_ratio: None,
        }
    }

    /// Set the number of samples.
    pub fn with_sample_count(mut self, count: u32) -> Self {
        self.sample_count = count;
        self
    }

    /// Set the aspect ratio.
    pub fn with_aspect_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.aspect_ratio = Some(ratio.into());
        self
    }
}

/// A normalized text response.
#[derive(Debug)]
pub struct TextResponse {
    /// The generated text content.
    pub text: String,

    /// HTTP status code (for diagnostics/logging).
    pub status: u16,

    /// Provider-specific usage metadata (token counts, model version).
    pub metadata: Option<Value>,
}

/// One generated image payload, as returned by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageData {
    /// MIME type of the encoded image, e.g. `"image/png"`.
    pub mime_type: String,

    /// Base64-encoded image bytes.
    pub data_base64: String,
}

impl ImageData {
    /// Decode the base64 payload into raw image bytes.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.data_base64)
            .map_err(|e| PipelineError::Other(format!("invalid base64 image payload: {e}")))
    }
}

/// Abstraction over generation providers.
///
/// Implementors translate the normalized request types into the
/// provider's HTTP API. The trait is object-safe and used as
/// `Arc<dyn Provider>` inside [`GenClient`](crate::client::GenClient).
#[async_trait]
pub trait Provider: Send + Sync {
    /// Execute one text-generation call.
    async fn generate_text(
        &self,
        http: &Client,
        base_url: &str,
        api_key: &str,
        request: &TextRequest,
    ) -> Result<TextResponse>;

    /// Execute one image-generation call.
    async fn generate_images(
        &self,
        http: &Client,
        base_url: &str,
        api_key: &str,
        request: &ImageRequest,
    ) -> Result<Vec<ImageData>>;

    /// Human-readable name for logging and diagnostics.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    #[test]
    fn test_text_request_builder() {
        let schema = Schema::object().field("summary", Schema::string());
        let request = TextRequest::new("gemini-2.0-flash", "Summarize: {notes}")
            .with_system("You are an editor.")
            .with_schema(&schema)
            .with_temperature(0.4)
            .with_max_output_tokens(1024);

        assert_eq!(request.model, "gemini-2.0-flash");
        assert_eq!(request.system_instruction.as_deref(), Some("You are an editor."));
        assert_eq!(request.response_schema.as_ref().unwrap()["type"], "OBJECT");
        assert_eq!(request.temperature, Some(0.4));
        assert_eq!(request.max_output_tokens, Some(1024));
    }

    #[test]
    fn test_image_request_builder() {
        let request = ImageRequest::new("imagen-3.0-generate-002", "a lighthouse")
            .with_sample_count(3)
            .with_aspect_ratio("16:9");
        assert_eq!(request.sample_count, 3);
        assert_eq!(request.aspect_ratio.as_deref(), Some("16:9"));
    }

    #[test]
    fn test_image_data_decodes_base64() {
        let data = ImageData {
            mime_type: "image/png".into(),
            data_base64: base64::engine::general_purpose::STANDARD.encode([1u8, 2, 3]),
        };
        assert_eq!(data.bytes().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_image_data_rejects_bad_base64() {
        let data = ImageData {
            mime_type: "image/png".into(),
            data_base64: "not base64!!".into(),
        };
        assert!(data.bytes().is_err());
    }
}
