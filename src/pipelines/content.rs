//! Content pipeline: research → draft → edit → publish → visualize.
//!
//! Each stage makes one schema-constrained call against the text model,
//! except visualize, which calls the image model once per prompt the
//! publish stage produced — and is skipped entirely, with a logged
//! reason, when that list is empty.

use crate::brief::ContentBrief;
use crate::client::GenClient;
use crate::context::StageContext;
use crate::error::{PipelineError, Result};
use crate::pipelines::GeneratedImage;
use crate::runner::{PipelineRunner, PipelineRunnerBuilder};
use crate::schema::Schema;
use crate::stage::{BoxFut, Stage, StagePlan};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Output of the research stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchBrief {
    /// Short overview of the topic.
    pub summary: String,

    /// Concrete facts and claims the draft should build on.
    pub key_points: Vec<String>,

    /// Optional editorial angle suggested by the model.
    #[serde(default)]
    pub suggested_angle: Option<String>,
}

impl ResearchBrief {
    /// Angle for display; `"--"` when the model omitted it.
    pub fn angle_display(&self) -> &str {
        self.suggested_angle
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("--")
    }
}

/// One section of a draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftSection {
    pub heading: String,
    pub body: String,
}

/// Output of the draft stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentDraft {
    pub title: String,
    pub main_sections: Vec<DraftSection>,
    #[serde(default)]
    pub conclusion: String,
}

/// Output of the edit stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditReview {
    /// Overall quality score, 0-100.
    pub overall_score: f64,

    #[serde(default)]
    pub strengths: Vec<String>,

    /// Concrete revisions the publish stage should apply.
    #[serde(default)]
    pub revisions: Vec<String>,
}

/// Output of the publish stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishPackage {
    pub final_title: String,

    /// The finished piece, in markdown.
    pub body_markdown: String,

    #[serde(default)]
    pub meta_description: Option<String>,

    /// Prompts for the visualize stage. May be empty, in which case
    /// visualize is skipped.
    #[serde(default)]
    pub image_prompts: Vec<String>,
}

impl PublishPackage {
    /// Meta description for display; `"--"` when the model omitted it.
    pub fn meta_description_display(&self) -> &str {
        self.meta_description
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("--")
    }

    /// The image prompts worth sending to the image model: trimmed and
    /// non-empty.
    pub fn usable_image_prompts(&self) -> Vec<&str> {
        self.image_prompts
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect()
    }
}

fn audience_or_general(brief: &ContentBrief) -> &str {
    if brief.audience.trim().is_empty() {
        "a general audience"
    } else {
        &brief.audience
    }
}

fn tone_or_neutral(brief: &ContentBrief) -> &str {
    if brief.tone.trim().is_empty() {
        "clear and neutral"
    } else {
        &brief.tone
    }
}

/// Gathers key points and a suggested angle for the topic.
struct ResearchStage;

impl ResearchStage {
    fn schema() -> Schema {
        Schema::object()
            .field("summary", Schema::string().describe("two or three sentences"))
            .field(
                "key_points",
                Schema::array(Schema::string()).describe("five to eight concrete facts or claims"),
            )
            .optional_field("suggested_angle", Schema::string())
    }

    fn prompt(brief: &ContentBrief) -> String {
        format!(
            "You are researching an article about \"{}\" aimed at {}.\n\
             Collect the most important, concrete points a writer would need, \
             plus a short summary and, if one stands out, a suggested editorial angle.",
            brief.topic,
            audience_or_general(brief),
        )
    }
}

impl Stage for ResearchStage {
    fn name(&self) -> &str {
        "research"
    }

    fn describe(&self) -> &str {
        "Researching the topic and gathering key points"
    }

    fn run<'a>(
        &'a self,
        client: &'a GenClient,
        ctx: &'a StageContext,
    ) -> BoxFut<'a, Result<Value>> {
        Box::pin(async move {
            let brief: ContentBrief = ctx.brief_as()?;
            let request = client
                .text_request(Self::prompt(&brief))
                .with_schema(&Self::schema())
                .with_temperature(0.3);
            let research: ResearchBrief = client.generate_json(request).await?;
            if research.key_points.is_empty() {
                return Err(PipelineError::Other(
                    "research produced no key points".to_string(),
                ));
            }
            Ok(serde_json::to_value(research)?)
        })
    }
}

/// Writes the full draft from the research output.
struct DraftStage;

impl DraftStage {
    fn schema() -> Schema {
        let section = Schema::object()
            .field("heading", Schema::string())
            .field("body", Schema::string());
        Schema::object()
            .field("title", Schema::string())
            .field("main_sections", Schema::array(section))
            .field("conclusion", Schema::string())
    }

    fn prompt(brief: &ContentBrief, research: &ResearchBrief) -> String {
        format!(
            "Write an article on \"{}\", around {} words, \
             in a {} tone, for {}.\n\nBuild on this research:\n{}\n\nKey points:\n- {}",
            brief.topic,
            brief.word_count_target,
            tone_or_neutral(brief),
            audience_or_general(brief),
            research.summary,
            research.key_points.join("\n- "),
        )
    }
}

impl Stage for DraftStage {
    fn name(&self) -> &str {
        "draft"
    }

    fn describe(&self) -> &str {
        "Drafting the article from the research"
    }

    fn run<'a>(
        &'a self,
        client: &'a GenClient,
        ctx: &'a StageContext,
    ) -> BoxFut<'a, Result<Value>> {
        Box::pin(async move {
            let brief: ContentBrief = ctx.brief_as()?;
            let research: ResearchBrief = ctx.require_as("research")?;
            let request = client
                .text_request(Self::prompt(&brief, &research))
                .with_schema(&Self::schema())
                .with_temperature(0.7);
            let draft: ContentDraft = client.generate_json(request).await?;
            if draft.main_sections.is_empty() {
                return Err(PipelineError::Other(
                    "draft contained no sections".to_string(),
                ));
            }
            Ok(serde_json::to_value(draft)?)
        })
    }
}

/// Scores the draft and lists the revisions to apply.
struct EditStage;

impl EditStage {
    fn schema() -> Schema {
        Schema::object()
            .field(
                "overall_score",
                Schema::number().describe("quality score between 0 and 100"),
            )
            .field("strengths", Schema::array(Schema::string()))
            .field("revisions", Schema::array(Schema::string()))
    }

    fn prompt(draft: &ContentDraft) -> Result<String> {
        Ok(format!(
            "Review this article draft as a senior editor. Score it 0-100 \
             and list the concrete revisions that would most improve it.\n\n{}",
            serde_json::to_string_pretty(draft)?,
        ))
    }
}

impl Stage for EditStage {
    fn name(&self) -> &str {
        "edit"
    }

    fn describe(&self) -> &str {
        "Reviewing the draft and collecting revisions"
    }

    fn run<'a>(
        &'a self,
        client: &'a GenClient,
        ctx: &'a StageContext,
    ) -> BoxFut<'a, Result<Value>> {
        Box::pin(async move {
            let draft: ContentDraft = ctx.require_as("draft")?;
            let request = client
                .text_request(Self::prompt(&draft)?)
                .with_schema(&Self::schema())
                .with_temperature(0.2);
            let review: EditReview = client.generate_json(request).await?;
            if !(0.0..=100.0).contains(&review.overall_score) {
                return Err(PipelineError::Other(format!(
                    "edit score {} outside 0-100",
                    review.overall_score
                )));
            }
            Ok(serde_json::to_value(review)?)
        })
    }
}

/// Applies the revisions and produces the final package.
struct PublishStage;

impl PublishStage {
    fn schema() -> Schema {
        Schema::object()
            .field("final_title", Schema::string())
            .field("body_markdown", Schema::string())
            .optional_field(
                "meta_description",
                Schema::string().describe("under 160 characters"),
            )
            .field(
                "image_prompts",
                Schema::array(Schema::string())
                    .describe("prompts for illustrative images; empty if none fit"),
            )
    }

    fn prompt(draft: &ContentDraft, review: &EditReview) -> Result<String> {
        Ok(format!(
            "Finalize this article for publication. Apply the listed revisions, \
             polish the prose, and propose image prompts for any sections that \
             would benefit from an illustration.\n\nDraft:\n{}\n\nRevisions:\n- {}",
            serde_json::to_string_pretty(draft)?,
            review.revisions.join("\n- "),
        ))
    }
}

impl Stage for PublishStage {
    fn name(&self) -> &str {
        "publish"
    }

    fn describe(&self) -> &str {
        "Applying revisions and assembling the final package"
    }

    fn run<'a>(
        &'a self,
        client: &'a GenClient,
        ctx: &'a StageContext,
    ) -> BoxFut<'a, Result<Value>> {
        Box::pin(async move {
            let draft: ContentDraft = ctx.require_as("draft")?;
            let review: EditReview = ctx.require_as("edit")?;
            let request = client
                .text_request(Self::prompt(&draft, &review)?)
                .with_schema(&Self::schema())
                .with_temperature(0.4);
            let package: PublishPackage = client.generate_json(request).await?;
            Ok(serde_json::to_value(package)?)
        })
    }
}

/// Generates one image per publish-stage prompt. Skipped when the
/// publish stage proposed none.
struct VisualizeStage;

impl VisualizeStage {
    fn prompts_from(ctx: &StageContext) -> Vec<String> {
        ctx.get("publish")
            .and_then(|v| serde_json::from_value::<PublishPackage>(v.clone()).ok())
            .map(|p| {
                p.usable_image_prompts()
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Stage for VisualizeStage {
    fn name(&self) -> &str {
        "visualize"
    }

    fn describe(&self) -> &str {
        "Generating one image per proposed prompt"
    }

    fn plan(&self, ctx: &StageContext) -> StagePlan {
        if Self::prompts_from(ctx).is_empty() {
            StagePlan::Skip("the publish stage produced no image prompts".to_string())
        } else {
            StagePlan::Run
        }
    }

    fn run<'a>(
        &'a self,
        client: &'a GenClient,
        ctx: &'a StageContext,
    ) -> BoxFut<'a, Result<Value>> {
        Box::pin(async move {
            let prompts = Self::prompts_from(ctx);
            let mut images = Vec::with_capacity(prompts.len());
            for prompt in prompts {
                let generated = client
                    .generate_images(client.image_request(&prompt).with_sample_count(1))
                    .await?;
                // One image per prompt; drop any extra samples.
                if let Some(image) = generated.into_iter().next() {
                    images.push(GeneratedImage {
                        prompt: prompt.clone(),
                        image,
                    });
                }
            }
            Ok(serde_json::to_value(images)?)
        })
    }
}

/// Builder for the content pipeline, stages pre-wired. Attach a
/// progress handler before building if the UI wants live events.
pub fn content_pipeline_builder() -> PipelineRunnerBuilder {
    PipelineRunner::builder("content")
        .add_stage(ResearchStage)
        .add_stage(DraftStage)
        .add_stage(EditStage)
        .add_stage(PublishStage)
        .add_stage(VisualizeStage)
}

/// The five-stage content pipeline.
pub fn content_pipeline() -> Result<PipelineRunner> {
    content_pipeline_builder().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::LogKind;
    use crate::provider::{MockProvider, MockReply};
    use crate::state::PipelineState;
    use serde_json::json;
    use std::sync::Arc;

    fn brief() -> ContentBrief {
        ContentBrief::new("Quantum Computing").with_word_count(1000)
    }

    fn research_reply() -> MockReply {
        MockReply::json(json!({
            "summary": "Quantum computers use qubits.",
            "key_points": ["superposition", "entanglement", "error correction"],
            "suggested_angle": "practical timelines"
        }))
    }

    fn draft_reply() -> MockReply {
        MockReply::json(json!({
            "title": "Quantum Computing, Practically",
            "main_sections": [
                {"heading": "Qubits", "body": "..."},
                {"heading": "Error correction", "body": "..."}
            ],
            "conclusion": "The hardware is catching up."
        }))
    }

    fn edit_reply(score: f64) -> MockReply {
        MockReply::json(json!({
            "overall_score": score,
            "strengths": ["clear structure"],
            "revisions": ["tighten the intro"]
        }))
    }

    fn publish_reply(prompts: Vec<&str>) -> MockReply {
        MockReply::json(json!({
            "final_title": "Quantum Computing, Practically",
            "body_markdown": "# Quantum Computing\n...",
            "meta_description": "What quantum hardware can really do today.",
            "image_prompts": prompts
        }))
    }

    fn client_with(replies: Vec<MockReply>) -> (GenClient, Arc<MockProvider>) {
        let mock = Arc::new(MockProvider::new(replies));
        let provider: Arc<dyn crate::provider::Provider> = mock.clone();
        (GenClient::with_provider(provider), mock)
    }

    #[tokio::test]
    async fn test_full_scenario_with_images() {
        let (client, mock) = client_with(vec![
            research_reply(),
            draft_reply(),
            edit_reply(87.0),
            publish_reply(vec!["qubit lattice render", "quantum lab photo"]),
            MockReply::image(),
            MockReply::image(),
        ]);

        let mut runner = content_pipeline().unwrap();
        runner.run(&client, &brief()).await.unwrap();

        assert_eq!(runner.state(), &PipelineState::Complete);
        assert_eq!(
            runner.context().stage_names(),
            vec!["research", "draft", "edit", "publish", "visualize"]
        );

        let research: ResearchBrief = runner.context().require_as("research").unwrap();
        assert!(!research.key_points.is_empty());

        let draft: ContentDraft = runner.context().require_as("draft").unwrap();
        assert!(!draft.main_sections.is_empty());

        let review: EditReview = runner.context().require_as("edit").unwrap();
        assert!((0.0..=100.0).contains(&review.overall_score));

        // One image per non-empty prompt.
        let images: Vec<GeneratedImage> = runner.context().require_as("visualize").unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].prompt, "qubit lattice render");
        assert_eq!(mock.text_calls(), 4);
        assert_eq!(mock.image_calls(), 2);
    }

    #[tokio::test]
    async fn test_visualize_skipped_when_no_prompts() {
        let (client, mock) = client_with(vec![
            research_reply(),
            draft_reply(),
            edit_reply(90.0),
            publish_reply(vec![]),
        ]);

        let mut runner = content_pipeline().unwrap();
        runner.run(&client, &brief()).await.unwrap();

        assert_eq!(runner.state(), &PipelineState::Complete);
        assert!(runner.context().get("visualize").is_none());
        assert_eq!(mock.image_calls(), 0);

        let skip = runner
            .log()
            .entries()
            .iter()
            .find(|e| e.kind == LogKind::Skipped)
            .expect("expected a skip entry");
        assert_eq!(skip.stage, "visualize");
        assert!(skip.message.contains("no image prompts"));
    }

    #[tokio::test]
    async fn test_blank_prompts_are_not_sent() {
        let (client, mock) = client_with(vec![
            research_reply(),
            draft_reply(),
            edit_reply(90.0),
            publish_reply(vec!["  ", "a real prompt", ""]),
            MockReply::image(),
        ]);

        let mut runner = content_pipeline().unwrap();
        runner.run(&client, &brief()).await.unwrap();

        let images: Vec<GeneratedImage> = runner.context().require_as("visualize").unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].prompt, "a real prompt");
        assert_eq!(mock.image_calls(), 1);
    }

    #[tokio::test]
    async fn test_edit_score_out_of_range_fails_pipeline() {
        let (client, mock) = client_with(vec![
            research_reply(),
            draft_reply(),
            edit_reply(140.0),
        ]);

        let mut runner = content_pipeline().unwrap();
        let err = runner.run(&client, &brief()).await.unwrap_err();

        assert!(err.to_string().contains("outside 0-100"));
        assert!(matches!(runner.state(), PipelineState::Failed { stage, .. } if stage == "edit"));
        // Publish and visualize never ran.
        assert_eq!(runner.context().stage_names(), vec!["research", "draft"]);
        assert_eq!(mock.text_calls(), 3);
        assert_eq!(mock.image_calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_draft_sections_fail() {
        let (client, _mock) = client_with(vec![
            research_reply(),
            MockReply::json(json!({
                "title": "Empty",
                "main_sections": [],
                "conclusion": ""
            })),
        ]);

        let mut runner = content_pipeline().unwrap();
        let err = runner.run(&client, &brief()).await.unwrap_err();
        assert!(err.to_string().contains("no sections"));
    }

    #[tokio::test]
    async fn test_empty_key_points_fail() {
        let (client, _mock) = client_with(vec![MockReply::json(json!({
            "summary": "thin",
            "key_points": []
        }))]);

        let mut runner = content_pipeline().unwrap();
        let err = runner.run(&client, &brief()).await.unwrap_err();
        assert!(err.to_string().contains("no key points"));
        assert!(matches!(
            runner.state(),
            PipelineState::Failed { stage, .. } if stage == "research"
        ));
    }

    #[tokio::test]
    async fn test_provider_failure_surfaces_verbatim() {
        let (client, _mock) = client_with(vec![
            research_reply(),
            MockReply::Fail("model overloaded".into()),
        ]);

        let mut runner = content_pipeline().unwrap();
        let err = runner.run(&client, &brief()).await.unwrap_err();
        match err {
            PipelineError::Generation { stage, message } => {
                assert_eq!(stage, "draft");
                assert!(message.contains("model overloaded"));
            }
            other => panic!("expected Generation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_reset_allows_fresh_run() {
        let (client, _mock) = client_with(vec![
            MockReply::Fail("boom".into()),
            // Replies for the second run.
            research_reply(),
            draft_reply(),
            edit_reply(75.0),
            publish_reply(vec![]),
        ]);

        let mut runner = content_pipeline().unwrap();
        let _ = runner.run(&client, &brief()).await;
        assert!(runner.state().is_terminal());

        runner.reset();
        runner.run(&client, &brief()).await.unwrap();
        assert_eq!(runner.state(), &PipelineState::Complete);
    }

    #[test]
    fn test_display_fallbacks_for_absent_fields() {
        let research = ResearchBrief {
            summary: "s".into(),
            key_points: vec!["k".into()],
            suggested_angle: None,
        };
        assert_eq!(research.angle_display(), "--");

        let package: PublishPackage = serde_json::from_value(json!({
            "final_title": "t",
            "body_markdown": "b"
        }))
        .unwrap();
        assert_eq!(package.meta_description_display(), "--");
        assert!(package.usable_image_prompts().is_empty());
    }

    #[test]
    fn test_stage_schemas_are_objects() {
        for schema in [
            ResearchStage::schema(),
            DraftStage::schema(),
            EditStage::schema(),
            PublishStage::schema(),
        ] {
            assert_eq!(schema.to_value()["type"], "OBJECT");
        }
    }
}
