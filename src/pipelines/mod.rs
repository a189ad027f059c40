//! Concrete pipelines built on the stage runner.
//!
//! Three pipelines ship with the crate: the five-stage [`content`]
//! pipeline (research → draft → edit → publish → visualize), the
//! two-stage [`image_studio`] pipeline (optimize → render), and the
//! two-stage [`poetry`] pipeline (compose → choreograph). All wire
//! fixed prompt templates and response schemas to the shared
//! [`GenClient`](crate::client::GenClient); none accepts
//! user-configurable stage lists.

pub mod content;
pub mod image_studio;
pub mod poetry;

pub use content::{
    content_pipeline, content_pipeline_builder, ContentDraft, DraftSection, EditReview,
    PublishPackage, ResearchBrief,
};
pub use image_studio::{image_studio_pipeline, image_studio_pipeline_builder, OptimizedPrompt};
pub use poetry::{poetry_pipeline, poetry_pipeline_builder, KineticScene, LineMotion, Poem, PoetryBrief};

use crate::error::Result;
use crate::provider::ImageData;
use serde::{Deserialize, Serialize};

/// One generated image together with the prompt that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// The prompt sent to the image model.
    pub prompt: String,

    /// The encoded image payload.
    #[serde(flatten)]
    pub image: ImageData,
}

impl GeneratedImage {
    /// Decode the image payload into raw bytes.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        self.image.bytes()
    }
}
