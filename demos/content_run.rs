//! Run the content pipeline end to end against the real provider.
//!
//! Requires `GEMINI_API_KEY` in the environment.
//!
//! ```bash
//! cargo run --example content_run -- "Quantum Computing"
//! ```

use std::sync::Arc;
use studio_pipeline::{
    content_pipeline_builder, ContentBrief, FnProgressHandler, GenClient, ProgressEvent,
    PublishPackage, ResearchBrief,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studio_pipeline=info".into()),
        )
        .init();

    let topic = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Quantum Computing".to_string());

    let client = GenClient::builder().build()?;
    let brief = ContentBrief::new(&topic)
        .with_audience("technical founders")
        .with_tone("practical, no hype")
        .with_word_count(1000);

    let handler = Arc::new(FnProgressHandler(|event: ProgressEvent| match event {
        ProgressEvent::StageStarted { stage, description } => {
            println!("▶ {stage}: {description}");
        }
        ProgressEvent::StageCompleted { stage } => println!("✓ {stage}"),
        ProgressEvent::StageSkipped { stage, reason } => println!("- {stage} skipped: {reason}"),
        ProgressEvent::StageFailed { stage, message } => println!("✗ {stage}: {message}"),
        ProgressEvent::PipelineFinished { ok } => {
            println!("pipeline finished (ok = {ok})");
        }
    }));

    let mut pipeline = content_pipeline_builder().progress_handler(handler).build()?;
    pipeline.run(&client, &brief).await?;

    let research: ResearchBrief = pipeline.context().require_as("research")?;
    println!("\nAngle: {}", research.angle_display());

    let package: PublishPackage = pipeline.context().require_as("publish")?;
    println!("Title: {}", package.final_title);
    println!("Meta:  {}", package.meta_description_display());
    println!("\n{}", package.body_markdown);

    Ok(())
}
