//! # Studio Pipeline
//!
//! Sequential stage runner for generative AI content workflows.
//!
//! This crate provides the core behind a multi-tool content studio:
//! a **runner** that drives an ordered list of stages, a shared
//! **client** for Gemini-style text and image generation, **schemas**
//! for structured output, and an append-only **run log** a UI can
//! render as-is.
//!
//! Stages execute strictly in order, each awaited to completion before
//! the next starts. A stage failure ends the run — no retries, no
//! rollback — with earlier results retained for display. Conditional
//! stages may skip themselves declaratively; a skip is logged and
//! makes no provider call.
//!
//! ## Core Concepts
//!
//! - **[`Stage`]** — object-safe trait for one unit of work backed by
//!   exactly one provider call.
//! - **[`PipelineRunner`]** — sequential executor owning state, log and
//!   accumulated results for one pipeline.
//! - **[`GenClient`]** — shared provider client (HTTP, credentials,
//!   default models).
//! - **[`Brief`]** — validated user configuration; a bad brief never
//!   reaches a stage.
//! - **[`Schema`]** — declarative response schemas for structured
//!   output.
//!
//! ## Quick Start
//!
//! ```no_run
//! use studio_pipeline::{content_pipeline, ContentBrief, GenClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GenClient::builder().api_key("your-key").build()?;
//!
//!     let brief = ContentBrief::new("Quantum Computing")
//!         .with_audience("technical founders")
//!         .with_word_count(1000);
//!
//!     let mut pipeline = content_pipeline()?;
//!     pipeline.run(&client, &brief).await?;
//!
//!     for record in pipeline.context().records() {
//!         println!("{}: {}", record.stage, record.value);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Testing
//!
//! [`MockProvider`](provider::MockProvider) returns canned replies in
//! order and counts calls, so pipelines are fully testable without a
//! live provider:
//!
//! ```
//! use studio_pipeline::provider::{MockProvider, MockReply};
//! use studio_pipeline::GenClient;
//! use std::sync::Arc;
//!
//! let mock = MockProvider::new(vec![MockReply::Text("{\"ok\": true}".into())]);
//! let client = GenClient::with_provider(Arc::new(mock));
//! ```

pub mod brief;
pub mod client;
pub mod context;
pub mod decode;
pub mod error;
pub mod log;
pub mod pipelines;
pub mod progress;
pub mod provider;
pub mod runner;
pub mod schema;
pub mod stage;
pub mod state;

pub use brief::{Brief, ContentBrief, ImageBrief};
pub use client::{GenClient, GenClientBuilder};
pub use context::{StageContext, StageRecord};
pub use error::{PipelineError, Result};
pub use log::{LogEntry, LogKind, RunLog};
pub use pipelines::{
    content_pipeline, content_pipeline_builder, image_studio_pipeline,
    image_studio_pipeline_builder, poetry_pipeline, poetry_pipeline_builder, ContentDraft,
    DraftSection, EditReview, GeneratedImage, KineticScene, LineMotion, OptimizedPrompt, Poem,
    PoetryBrief, PublishPackage, ResearchBrief,
};
pub use progress::{FnProgressHandler, ProgressEvent, ProgressHandler};
pub use runner::{PipelineRunner, PipelineRunnerBuilder};
pub use schema::Schema;
pub use stage::{BoxFut, Stage, StagePlan};
pub use state::{PipelineSnapshot, PipelineState};
