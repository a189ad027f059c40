//! Shared generation client.
//!
//! [`GenClient`] carries the HTTP client, provider, credentials and
//! default model identifiers. It is constructed once and shared by
//! every stage in a run; each stage makes exactly one call through it.

use crate::decode;
use crate::error::{PipelineError, Result};
use crate::provider::{GeminiProvider, ImageData, ImageRequest, Provider, TextRequest};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Default base URL for the Gemini API family.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model for text stages.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.0-flash";

/// Default model for image stages.
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-3.0-generate-002";

/// Environment variable consulted for the API key when none is passed
/// to the builder.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Shared client for generation provider calls.
///
/// # Example
///
/// ```no_run
/// use studio_pipeline::GenClient;
///
/// let client = GenClient::builder()
///     .api_key("your-key")
///     .build()?;
/// # Ok::<(), studio_pipeline::PipelineError>(())
/// ```
pub struct GenClient {
    http: Client,
    base_url: String,
    api_key: String,
    provider: Arc<dyn Provider>,
    text_model: String,
    image_model: String,
}

impl GenClient {
    /// Create a new builder.
    pub fn builder() -> GenClientBuilder {
        GenClientBuilder {
            http: None,
            base_url: None,
            api_key: None,
            provider: None,
            text_model: None,
            image_model: None,
            timeout: None,
        }
    }

    /// Shorthand: a client around a custom provider with defaults for
    /// everything else. Used throughout the tests with
    /// [`MockProvider`](crate::provider::MockProvider).
    pub fn with_provider(provider: Arc<dyn Provider>) -> Self {
        // A custom provider never requires an API key, so this cannot
        // fail on configuration.
        Self::builder()
            .provider(provider)
            .build()
            .expect("building a provider-backed client failed")
    }

    /// A [`TextRequest`] against the client's default text model.
    pub fn text_request(&self, prompt: impl Into<String>) -> TextRequest {
        TextRequest::new(self.text_model.clone(), prompt)
    }

    /// An [`ImageRequest`] against the client's default image model.
    pub fn image_request(&self, prompt: impl Into<String>) -> ImageRequest {
        ImageRequest::new(self.image_model.clone(), prompt)
    }

    /// One text-generation call returning the raw text.
    pub async fn generate_text(&self, request: TextRequest) -> Result<String> {
        let response = self
            .provider
            .generate_text(&self.http, &self.base_url, &self.api_key, &request)
            .await?;
        tracing::debug!(
            provider = self.provider.name(),
            model = %request.model,
            status = response.status,
            metadata = ?response.metadata,
            "text generation call completed"
        );
        Ok(response.text)
    }

    /// One text-generation call decoded into a typed `T`.
    ///
    /// The raw text goes through defensive extraction and strict
    /// validation ([`decode::decode_json`]); a response that does not
    /// yield a `T` is an error.
    pub async fn generate_json<T: DeserializeOwned>(&self, request: TextRequest) -> Result<T> {
        let text = self.generate_text(request).await?;
        decode::decode_json(&text)
    }

    /// One image-generation call.
    pub async fn generate_images(&self, request: ImageRequest) -> Result<Vec<ImageData>> {
        let images = self
            .provider
            .generate_images(&self.http, &self.base_url, &self.api_key, &request)
            .await?;
        tracing::debug!(
            provider = self.provider.name(),
            model = %request.model,
            count = images.len(),
            "image generation call completed"
        );
        Ok(images)
    }

    /// Name of the configured provider.
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}

impl std::fmt::Debug for GenClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenClient")
            .field("base_url", &self.base_url)
            .field("provider", &self.provider.name())
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .field("has_api_key", &!self.api_key.is_empty())
            .finish()
    }
}

/// Builder for [`GenClient`].
pub struct GenClientBuilder {
    http: Option<Client>,
    base_url: Option<String>,
    api_key: Option<String>,
    provider: Option<Arc<dyn Provider>>,
    text_model: Option<String>,
    image_model: Option<String>,
    timeout: Option<Duration>,
}

impl GenClientBuilder {
    /// Set the HTTP client. If not set, one is built with the
    /// configured timeout.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http = Some(client);
        self
    }

    /// Override the provider base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the API key explicitly. When absent, `GEMINI_API_KEY` is
    /// consulted at build time.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Swap in a custom provider. Custom providers own their own
    /// authentication, so no API key is required.
    pub fn provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Default model for text stages.
    pub fn text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = Some(model.into());
        self
    }

    /// Default model for image stages.
    pub fn image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = Some(model.into());
        self
    }

    /// Request timeout for the built HTTP client. Default: 60 seconds.
    /// Ignored when a custom client is supplied via `http_client`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    ///
    /// Fails with a configuration error when the default provider is
    /// used and no API key could be resolved.
    pub fn build(self) -> Result<GenClient> {
        let custom_provider = self.provider.is_some();
        let api_key = self
            .api_key
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty());

        let api_key = match api_key {
            Some(key) => key,
            None if custom_provider => String::new(),
            None => {
                return Err(PipelineError::Configuration(format!(
                    "no API key: pass one to the builder or set {API_KEY_ENV}"
                )))
            }
        };

        let timeout = self.timeout.unwrap_or(Duration::from_secs(60));
        let http = match self.http {
            Some(client) => client,
            None => Client::builder()
                .timeout(timeout)
                .build()
                .map_err(PipelineError::Request)?,
        };

        Ok(GenClient {
            http,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            provider: self
                .provider
                .unwrap_or_else(|| Arc::new(GeminiProvider)),
            text_model: self
                .text_model
                .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            image_model: self
                .image_model
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MockProvider, MockReply};
    use serde_json::json;

    #[test]
    fn test_builder_requires_api_key_for_default_provider() {
        // An explicitly blank key does not count.
        let result = GenClient::builder().api_key("   ").build();
        match result {
            Err(PipelineError::Configuration(msg)) => assert!(msg.contains("API key")),
            other => panic!("expected Configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_builder_with_api_key() {
        let client = GenClient::builder().api_key("test-key").build().unwrap();
        assert_eq!(client.provider_name(), "gemini");
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_custom_provider_needs_no_key() {
        let client = GenClient::builder()
            .provider(Arc::new(MockProvider::default()))
            .api_key("")
            .build()
            .unwrap();
        assert_eq!(client.provider_name(), "mock");
        assert!(client.api_key.is_empty());
    }

    #[test]
    fn test_default_request_models() {
        let client = GenClient::with_provider(Arc::new(MockProvider::default()));
        assert_eq!(client.text_request("hi").model, DEFAULT_TEXT_MODEL);
        assert_eq!(client.image_request("hi").model, DEFAULT_IMAGE_MODEL);
    }

    #[test]
    fn test_model_overrides() {
        let client = GenClient::builder()
            .provider(Arc::new(MockProvider::default()))
            .text_model("gemini-2.5-pro")
            .image_model("imagen-4.0")
            .build()
            .unwrap();
        assert_eq!(client.text_request("x").model, "gemini-2.5-pro");
        assert_eq!(client.image_request("x").model, "imagen-4.0");
    }

    #[tokio::test]
    async fn test_generate_json_decodes_typed() {
        #[derive(serde::Deserialize)]
        struct Out {
            answer: String,
        }

        let mock = MockProvider::new(vec![MockReply::json(json!({"answer": "blue"}))]);
        let client = GenClient::with_provider(Arc::new(mock));
        let out: Out = client
            .generate_json(client.text_request("why is the sky blue?"))
            .await
            .unwrap();
        assert_eq!(out.answer, "blue");
    }

    #[tokio::test]
    async fn test_generate_json_rejects_prose() {
        let mock = MockProvider::new(vec![MockReply::Text("I cannot answer that.".into())]);
        let client = GenClient::with_provider(Arc::new(mock));
        let result: Result<serde_json::Value> =
            client.generate_json(client.text_request("prompt")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_generate_images_passes_through() {
        let mock = MockProvider::new(vec![MockReply::image()]);
        let client = GenClient::with_provider(Arc::new(mock));
        let images = client
            .generate_images(client.image_request("a lighthouse"))
            .await
            .unwrap();
        assert_eq!(images.len(), 1);
    }
}
