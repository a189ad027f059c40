//! Poetry pipeline: compose → choreograph.
//!
//! The compose stage writes a short poem for the requested theme and
//! form; the choreograph stage turns it into kinetic-typography scene
//! parameters (palette, motion, per-line timing) a renderer can play
//! back directly.

use crate::brief::Brief;
use crate::client::GenClient;
use crate::context::StageContext;
use crate::error::{PipelineError, Result};
use crate::runner::{PipelineRunner, PipelineRunnerBuilder};
use crate::schema::Schema;
use crate::stage::{BoxFut, Stage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Configuration for a poetry run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoetryBrief {
    /// Theme to write about.
    pub theme: String,

    /// Poetic form, e.g. "haiku", "free verse", "sonnet".
    #[serde(default = "default_form")]
    pub form: String,
}

fn default_form() -> String {
    "free verse".to_string()
}

impl PoetryBrief {
    /// Create a free-verse brief for the given theme.
    pub fn new(theme: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
            form: default_form(),
        }
    }

    /// Set the poetic form.
    pub fn with_form(mut self, form: impl Into<String>) -> Self {
        self.form = form.into();
        self
    }
}

impl Brief for PoetryBrief {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.theme.trim().is_empty() {
            return Err("theme must not be empty".to_string());
        }
        Ok(())
    }
}

/// Output of the compose stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poem {
    pub title: String,

    /// The poem, one entry per line.
    pub lines: Vec<String>,

    /// One-word mood, used to seed the choreography.
    #[serde(default)]
    pub mood: Option<String>,
}

impl Poem {
    /// Mood for display; `"--"` when the model omitted it.
    pub fn mood_display(&self) -> &str {
        self.mood
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("--")
    }
}

/// Animation parameters for one poem line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineMotion {
    pub line: String,

    /// Entry animation, e.g. "drift-up", "fade", "scatter".
    pub motion: String,

    /// When the line appears, in milliseconds from scene start.
    pub start_ms: u32,

    /// How long the line stays on screen, in milliseconds.
    pub duration_ms: u32,
}

/// Output of the choreograph stage — a renderable kinetic scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KineticScene {
    /// Background color, hex.
    pub background: String,

    /// Text color, hex.
    pub foreground: String,

    /// Per-line animation, in display order.
    pub line_motions: Vec<LineMotion>,
}

/// Writes the poem.
struct ComposeStage;

impl ComposeStage {
    fn schema() -> Schema {
        Schema::object()
            .field("title", Schema::string())
            .field(
                "lines",
                Schema::array(Schema::string()).describe("the poem, one entry per line"),
            )
            .optional_field("mood", Schema::string().describe("one word"))
    }

    fn prompt(brief: &PoetryBrief) -> String {
        format!(
            "Write a {} about \"{}\". Keep it tight and concrete; \
             no title case in the body, no explanations.",
            brief.form, brief.theme,
        )
    }
}

impl Stage for ComposeStage {
    fn name(&self) -> &str {
        "compose"
    }

    fn describe(&self) -> &str {
        "Composing the poem"
    }

    fn run<'a>(
        &'a self,
        client: &'a GenClient,
        ctx: &'a StageContext,
    ) -> BoxFut<'a, Result<Value>> {
        Box::pin(async move {
            let brief: PoetryBrief = ctx.brief_as()?;
            let request = client
                .text_request(Self::prompt(&brief))
                .with_schema(&Self::schema())
                .with_temperature(0.9);
            let poem: Poem = client.generate_json(request).await?;
            if poem.lines.is_empty() {
                return Err(PipelineError::Other("poem contained no lines".to_string()));
            }
            Ok(serde_json::to_value(poem)?)
        })
    }
}

/// Maps the poem to kinetic-typography parameters.
struct ChoreographStage;

impl ChoreographStage {
    fn schema() -> Schema {
        let line_motion = Schema::object()
            .field("line", Schema::string())
            .field(
                "motion",
                Schema::enumeration(["drift-up", "fade", "scatter", "typewriter", "pulse"]),
            )
            .field("start_ms", Schema::integer())
            .field("duration_ms", Schema::integer());
        Schema::object()
            .field("background", Schema::string().describe("hex color"))
            .field("foreground", Schema::string().describe("hex color"))
            .field("line_motions", Schema::array(line_motion))
    }

    fn prompt(poem: &Poem) -> Result<String> {
        Ok(format!(
            "Design a kinetic-typography scene for this poem: pick a background \
             and text color that fit its mood, and give every line an entry \
             motion with start and duration timings that read naturally.\n\n{}",
            serde_json::to_string_pretty(poem)?,
        ))
    }
}

impl Stage for ChoreographStage {
    fn name(&self) -> &str {
        "choreograph"
    }

    fn describe(&self) -> &str {
        "Choreographing the kinetic scene"
    }

    fn run<'a>(
        &'a self,
        client: &'a GenClient,
        ctx: &'a StageContext,
    ) -> BoxFut<'a, Result<Value>> {
        Box::pin(async move {
            let poem: Poem = ctx.require_as("compose")?;
            let request = client
                .text_request(Self::prompt(&poem)?)
                .with_schema(&Self::schema())
                .with_temperature(0.5);
            let scene: KineticScene = client.generate_json(request).await?;
            if scene.line_motions.len() != poem.lines.len() {
                return Err(PipelineError::Other(format!(
                    "scene has {} line motions for {} poem lines",
                    scene.line_motions.len(),
                    poem.lines.len()
                )));
            }
            Ok(serde_json::to_value(scene)?)
        })
    }
}

/// Builder for the poetry pipeline, stages pre-wired.
pub fn poetry_pipeline_builder() -> PipelineRunnerBuilder {
    PipelineRunner::builder("poetry")
        .add_stage(ComposeStage)
        .add_stage(ChoreographStage)
}

/// The two-stage poetry pipeline.
pub fn poetry_pipeline() -> Result<PipelineRunner> {
    poetry_pipeline_builder().build()
}
