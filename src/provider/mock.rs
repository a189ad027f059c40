//! Mock provider for testing without a live generation service.
//!
//! [`MockProvider`] hands out pre-configured replies in order and
//! counts how many text/image calls were made, so tests can assert
//! both pipeline output and that skipped stages made no call at all.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{ImageData, ImageRequest, Provider, TextRequest, TextResponse};
use crate::error::{PipelineError, Result};

/// One canned reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// A text response, returned verbatim.
    Text(String),
    /// An image response.
    Images(Vec<ImageData>),
    /// A provider failure with the given message.
    Fail(String),
}

impl MockReply {
    /// A text reply holding the serialized JSON value.
    pub fn json(value: Value) -> Self {
        MockReply::Text(value.to_string())
    }

    /// A single-image reply with a placeholder payload.
    pub fn image() -> Self {
        MockReply::Images(vec![ImageData {
            mime_type: "image/png".to_string(),
            data_base64: "aW1n".to_string(),
        }])
    }
}

/// A test provider that returns canned replies in order.
///
/// Replies are consumed front to back; asking for more replies than
/// were configured is an error, which keeps tests honest about how
/// many provider calls a pipeline actually makes.
#[derive(Debug, Default)]
pub struct MockProvider {
    replies: Mutex<VecDeque<MockReply>>,
    text_calls: AtomicUsize,
    image_calls: AtomicUsize,
}

impl MockProvider {
    /// Create a mock with the given reply sequence.
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            text_calls: AtomicUsize::new(0),
            image_calls: AtomicUsize::new(0),
        }
    }

    /// Number of text-generation calls made so far.
    pub fn text_calls(&self) -> usize {
        self.text_calls.load(Ordering::Relaxed)
    }

    /// Number of image-generation calls made so far.
    pub fn image_calls(&self) -> usize {
        self.image_calls.load(Ordering::Relaxed)
    }

    fn next_reply(&self) -> Result<MockReply> {
        self.replies
            .lock()
            .expect("mock reply queue poisoned")
            .pop_front()
            .ok_or_else(|| PipelineError::Other("mock provider has no replies left".to_string()))
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn generate_text(
        &self,
        _http: &Client,
        _base_url: &str,
        _api_key: &str,
        _request: &TextRequest,
    ) -> Result<TextResponse> {
        self.text_calls.fetch_add(1, Ordering::Relaxed);
        match self.next_reply()? {
            MockReply::Text(text) => Ok(TextResponse {
                text,
                status: 200,
                metadata: None,
            }),
            MockReply::Fail(message) => Err(PipelineError::Other(message)),
            MockReply::Images(_) => Err(PipelineError::Other(
                "mock reply mismatch: expected text, configured images".to_string(),
            )),
        }
    }

    async fn generate_images(
        &self,
        _http: &Client,
        _base_url: &str,
        _api_key: &str,
        _request: &ImageRequest,
    ) -> Result<Vec<ImageData>> {
        self.image_calls.fetch_add(1, Ordering::Relaxed);
        match self.next_reply()? {
            MockReply::Images(images) => Ok(images),
            MockReply::Fail(message) => Err(PipelineError::Other(message)),
            MockReply::Text(_) => Err(PipelineError::Other(
                "mock reply mismatch: expected images, configured text".to_string(),
            )),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
