//! Image studio pipeline: optimize → render.
//!
//! The optimize stage rewrites the raw user prompt into something the
//! image model responds well to; the render stage then generates the
//! requested number of images from the optimized prompt. A blank user
//! prompt is rejected as configuration before either stage runs.

use crate::brief::ImageBrief;
use crate::client::GenClient;
use crate::context::StageContext;
use crate::error::{PipelineError, Result};
use crate::pipelines::GeneratedImage;
use crate::runner::{PipelineRunner, PipelineRunnerBuilder};
use crate::schema::Schema;
use crate::stage::{BoxFut, Stage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Output of the optimize stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizedPrompt {
    /// The rewritten prompt sent to the image model.
    pub optimized_prompt: String,

    /// Why the rewrite helps, for display alongside the result.
    #[serde(default)]
    pub rationale: Option<String>,
}

impl OptimizedPrompt {
    /// Rationale for display; `"--"` when the model omitted it.
    pub fn rationale_display(&self) -> &str {
        self.rationale
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("--")
    }
}

/// Rewrites the raw prompt for the image model.
struct OptimizeStage;

impl OptimizeStage {
    fn schema() -> Schema {
        Schema::object()
            .field(
                "optimized_prompt",
                Schema::string().describe("a single richly detailed image prompt"),
            )
            .optional_field("rationale", Schema::string())
    }

    fn prompt(brief: &ImageBrief) -> String {
        let style = brief.style.as_deref().unwrap_or("the subject's natural style");
        format!(
            "Rewrite this image request as one detailed prompt an image model \
             responds well to: subject, composition, lighting, mood. \
             Style: {style}.\n\nRequest: {}",
            brief.prompt,
        )
    }
}

impl Stage for OptimizeStage {
    fn name(&self) -> &str {
        "optimize"
    }

    fn describe(&self) -> &str {
        "Rewriting the prompt for the image model"
    }

    fn run<'a>(
        &'a self,
        client: &'a GenClient,
        ctx: &'a StageContext,
    ) -> BoxFut<'a, Result<Value>> {
        Box::pin(async move {
            let brief: ImageBrief = ctx.brief_as()?;
            let request = client
                .text_request(Self::prompt(&brief))
                .with_schema(&Self::schema())
                .with_temperature(0.6);
            let optimized: OptimizedPrompt = client.generate_json(request).await?;
            if optimized.optimized_prompt.trim().is_empty() {
                return Err(PipelineError::Other(
                    "optimize produced an empty prompt".to_string(),
                ));
            }
            Ok(serde_json::to_value(optimized)?)
        })
    }
}

/// Generates the requested images from the optimized prompt.
struct RenderStage;

impl Stage for RenderStage {
    fn name(&self) -> &str {
        "render"
    }

    fn describe(&self) -> &str {
        "Generating images from the optimized prompt"
    }

    fn run<'a>(
        &'a self,
        client: &'a GenClient,
        ctx: &'a StageContext,
    ) -> BoxFut<'a, Result<Value>> {
        Box::pin(async move {
            let brief: ImageBrief = ctx.brief_as()?;
            let optimized: OptimizedPrompt = ctx.require_as("optimize")?;

            let mut request = client
                .image_request(&optimized.optimized_prompt)
                .with_sample_count(brief.image_count);
            if let Some(ref ratio) = brief.aspect_ratio {
                request = request.with_aspect_ratio(ratio.clone());
            }

            let images: Vec<GeneratedImage> = client
                .generate_images(request)
                .await?
                .into_iter()
                .map(|image| GeneratedImage {
                    prompt: optimized.optimized_prompt.clone(),
                    image,
                })
                .collect();
            Ok(serde_json::to_value(images)?)
        })
    }
}

/// Builder for the image studio pipeline, stages pre-wired.
pub fn image_studio_pipeline_builder() -> PipelineRunnerBuilder {
    PipelineRunner::builder("image-studio")
        .add_stage(OptimizeStage)
        .add_stage(RenderStage)
}

/// The two-stage image studio pipeline.
pub fn image_studio_pipeline() -> Result<PipelineRunner> {
    image_studio_pipeline_builder().build()
}
