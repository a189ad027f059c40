//! Provider for the Gemini API family.
//!
//! [`GeminiProvider`] translates normalized requests into
//! `models/{model}:generateContent` (text, with optional structured
//! output) and `models/{model}:predict` (Imagen images). The API key is
//! sent via the `x-goog-api-key` header.
//!
//! This is the default provider.

use super::{ImageData, ImageRequest, Provider, TextRequest, TextResponse};
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

/// Provider for Gemini text generation and Imagen image generation.
///
/// Endpoints: `/v1beta/models/{model}:generateContent` and
/// `/v1beta/models/{model}:predict`. When a request carries a response
/// schema, the body asks for `responseMimeType: application/json`
/// constrained to that schema.
#[derive(Debug, Clone, Default)]
pub struct GeminiProvider;

impl GeminiProvider {
    /// Build the JSON body for a `generateContent` call.
    fn build_text_body(request: &TextRequest) -> Value {
        let mut body = json!({
            "contents": [{
                "role": "user",
                "parts": [{"text": request.prompt}],
            }],
        });

        if let Some(ref system) = request.system_instruction {
            if !system.is_empty() {
                body["systemInstruction"] = json!({"parts": [{"text": system}]});
            }
        }

        let mut generation_config = serde_json::Map::new();
        if let Some(temperature) = request.temperature {
            generation_config.insert("temperature".into(), json!(temperature));
        }
        if let Some(tokens) = request.max_output_tokens {
            generation_config.insert("maxOutputTokens".into(), json!(tokens));
        }
        if let Some(ref schema) = request.response_schema {
            generation_config.insert("responseMimeType".into(), json!("application/json"));
            generation_config.insert("responseSchema".into(), schema.clone());
        }
        if !generation_config.is_empty() {
            body["generationConfig"] = Value::Object(generation_config);
        }

        body
    }

    /// Build the JSON body for a `predict` (Imagen) call.
    fn build_image_body(request: &ImageRequest) -> Value {
        let mut parameters = json!({"sampleCount": request.sample_count});
        if let Some(ref ratio) = request.aspect_ratio {
            parameters["aspectRatio"] = json!(ratio);
        }
        json!({
            "instances": [{"prompt": request.prompt}],
            "parameters": parameters,
        })
    }

    /// POST a body and return the parsed JSON response with its status.
    async fn send(http: &Client, url: &str, api_key: &str, body: &Value) -> Result<(Value, u16)> {
        let resp = http
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                PipelineError::Other(format!("failed to reach provider at {url}: {e}"))
            })?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(PipelineError::Http {
                status,
                body: body_text,
            });
        }

        let parsed: Value = resp.json().await?;
        Ok((parsed, status))
    }

    /// Concatenate the text parts of the first candidate.
    ///
    /// An empty candidate list or a block reason means the provider
    /// returned no usable payload.
    fn extract_text(response: &Value) -> Result<String> {
        if let Some(reason) = response
            .pointer("/promptFeedback/blockReason")
            .and_then(|v| v.as_str())
        {
            return Err(PipelineError::Other(format!(
                "provider blocked the prompt: {reason}"
            )));
        }

        let parts = response
            .pointer("/candidates/0/content/parts")
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                PipelineError::Other("provider returned no candidates".to_string())
            })?;

        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|v| v.as_str()))
            .collect();

        if text.is_empty() {
            return Err(PipelineError::Other(
                "provider candidate contained no text".to_string(),
            ));
        }
        Ok(text)
    }

    /// Extract usage metadata fields worth logging.
    fn extract_metadata(response: &Value) -> Option<Value> {
        let mut meta = serde_json::Map::new();
        if let Some(usage) = response.get("usageMetadata") {
            for key in ["promptTokenCount", "candidatesTokenCount", "totalTokenCount"] {
                if let Some(v) = usage.get(key) {
                    meta.insert(key.into(), v.clone());
                }
            }
        }
        if let Some(v) = response.get("modelVersion") {
            meta.insert("modelVersion".into(), v.clone());
        }
        if meta.is_empty() {
            None
        } else {
            Some(Value::Object(meta))
        }
    }

    /// Pull the image payloads out of a `predict` response.
    fn extract_images(response: &Value) -> Result<Vec<ImageData>> {
        let predictions = response
            .get("predictions")
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                PipelineError::Other("provider returned no predictions".to_string())
            })?;

        let images: Vec<ImageData> = predictions
            .iter()
            .filter_map(|p| {
                let data = p.get("bytesBase64Encoded")?.as_str()?;
                Some(ImageData {
                    mime_type: p
                        .get("mimeType")
                        .and_then(|v| v.as_str())
                        .unwrap_or("image/png")
                        .to_string(),
                    data_base64: data.to_string(),
                })
            })
            .collect();

        if images.is_empty() {
            return Err(PipelineError::Other(
                "provider predictions contained no image data".to_string(),
            ));
        }
        Ok(images)
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn generate_text(
        &self,
        http: &Client,
        base_url: &str,
        api_key: &str,
        request: &TextRequest,
    ) -> Result<TextResponse> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            base_url.trim_end_matches('/'),
            request.model
        );
        let body = Self::build_text_body(request);
        let (response, status) = Self::send(http, &url, api_key, &body).await?;

        Ok(TextResponse {
            text: Self::extract_text(&response)?,
            status,
            metadata: Self::extract_metadata(&response),
        })
    }

    async fn generate_images(
        &self,
        http: &Client,
        base_url: &str,
        api_key: &str,
        request: &ImageRequest,
    ) -> Result<Vec<ImageData>> {
        let url = format!(
            "{}/v1beta/models/{}:predict",
            base_url.trim_end_matches('/'),
            request.model
        );
        let body = Self::build_image_body(request);
        let (response, _status) = Self::send(http, &url, api_key, &body).await?;
        Self::extract_images(&response)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
