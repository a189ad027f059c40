//! Run the image studio pipeline and save the generated images.
//!
//! Requires `GEMINI_API_KEY` in the environment.
//!
//! ```bash
//! cargo run --example image_studio_run -- "a lighthouse at dusk"
//! ```

use studio_pipeline::{
    image_studio_pipeline, GenClient, GeneratedImage, ImageBrief, OptimizedPrompt,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studio_pipeline=info".into()),
        )
        .init();

    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "a lighthouse at dusk".to_string());

    let client = GenClient::builder().build()?;
    let brief = ImageBrief::new(&prompt)
        .with_style("cinematic photography")
        .with_aspect_ratio("16:9")
        .with_image_count(2);

    let mut pipeline = image_studio_pipeline()?;
    pipeline.run(&client, &brief).await?;

    let optimized: OptimizedPrompt = pipeline.context().require_as("optimize")?;
    println!("Optimized prompt: {}", optimized.optimized_prompt);
    println!("Rationale: {}", optimized.rationale_display());

    let images: Vec<GeneratedImage> = pipeline.context().require_as("render")?;
    for (index, image) in images.iter().enumerate() {
        let extension = image.image.mime_type.rsplit('/').next().unwrap_or("png");
        let path = format!("studio-image-{index}.{extension}");
        std::fs::write(&path, image.bytes()?)?;
        println!("wrote {path}");
    }

    Ok(())
}
