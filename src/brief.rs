//! User-supplied run configuration ("briefs").
//!
//! A brief captures everything the user submits before a run starts.
//! Briefs are validated up front — a bad brief never reaches a stage —
//! and are immutable once the runner has serialized them into the
//! stage context.

use serde::{Deserialize, Serialize};

/// A validated, serializable run configuration.
///
/// The runner calls [`Brief::validate`] before any stage executes and
/// refuses to start the run if it fails.
pub trait Brief: Serialize {
    /// Check that every required input is present and well-formed.
    ///
    /// Returns a human-readable reason on failure.
    fn validate(&self) -> std::result::Result<(), String>;
}

fn default_word_count() -> u32 {
    1000
}

fn default_image_count() -> u32 {
    1
}

/// Configuration for a content pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBrief {
    /// The subject to write about.
    pub topic: String,

    /// Intended audience, e.g. "startup founders".
    #[serde(default)]
    pub audience: String,

    /// Desired tone of voice, e.g. "authoritative but approachable".
    #[serde(default)]
    pub tone: String,

    /// Target length of the final piece, in words.
    #[serde(default = "default_word_count")]
    pub word_count_target: u32,
}

impl ContentBrief {
    /// Create a brief for the given topic with default audience, tone
    /// and word count.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            audience: String::new(),
            tone: String::new(),
            word_count_target: default_word_count(),
        }
    }

    /// Set the intended audience.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    /// Set the tone of voice.
    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = tone.into();
        self
    }

    /// Set the word count target.
    pub fn with_word_count(mut self, words: u32) -> Self {
        self.word_count_target = words;
        self
    }
}

impl Brief for ContentBrief {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.topic.trim().is_empty() {
            return Err("topic must not be empty".to_string());
        }
        if self.word_count_target == 0 {
            return Err("word count target must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Configuration for an image studio run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageBrief {
    /// Raw user prompt describing the desired image.
    pub prompt: String,

    /// Optional style hint, e.g. "watercolor", "product photography".
    #[serde(default)]
    pub style: Option<String>,

    /// Aspect ratio understood by the image model, e.g. "1:1", "16:9".
    #[serde(default)]
    pub aspect_ratio: Option<String>,

    /// Number of images to generate. Range: 1-4.
    #[serde(default = "default_image_count")]
    pub image_count: u32,
}

impl ImageBrief {
    /// Create a brief for the given prompt with a single square image.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            style: None,
            aspect_ratio: None,
            image_count: default_image_count(),
        }
    }

    /// Set a style hint.
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Set the aspect ratio.
    pub fn with_aspect_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.aspect_ratio = Some(ratio.into());
        self
    }

    /// Set the number of images to generate.
    pub fn with_image_count(mut self, count: u32) -> Self {
        self.image_count = count;
        self
    }
}

impl Brief for ImageBrief {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.prompt.trim().is_empty() {
            return Err("image prompt must not be empty".to_string());
        }
        if !(1..=4).contains(&self.image_count) {
            return Err(format!(
                "image count must be between 1 and 4, got {}",
                self.image_count
            ));
        }
        Ok(())
    }
}
