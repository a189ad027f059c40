use thiserror::Error;

/// Errors produced by the pipeline runner and its components.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A required input was missing or invalid before any stage started.
    /// The pipeline never leaves `Idle` when this is returned.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A stage's provider call failed or returned unusable data.
    /// Terminal for the run; no later stage executes.
    #[error("Stage '{stage}' failed: {message}")]
    Generation { stage: String, message: String },

    /// Low-level HTTP transport failure (connection refused, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed at the serde level.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The provider returned a non-success status code, with body text.
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code (e.g. 400, 429, 500).
        status: u16,
        /// Response body text.
        body: String,
    },

    /// Pipeline misuse detected outside stage execution: an empty stage
    /// list at build time, or starting a run while not idle.
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(String),
}

impl PipelineError {
    /// Wrap any error as a stage-level generation failure.
    ///
    /// Existing `Generation` errors pass through unchanged so the
    /// original stage attribution survives nesting.
    pub fn for_stage(stage: &str, err: PipelineError) -> Self {
        match err {
            already @ PipelineError::Generation { .. } => already,
            other => PipelineError::Generation {
                stage: stage.to_string(),
                message: other.to_string(),
            },
        }
    }
}

impl From<anyhow::Error> for PipelineError {
    fn from(err: anyhow::Error) -> Self {
        PipelineError::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_stage_wraps_other_errors() {
        let err = PipelineError::for_stage("draft", PipelineError::Other("boom".into()));
        match err {
            PipelineError::Generation { stage, message } => {
                assert_eq!(stage, "draft");
                assert_eq!(message, "boom");
            }
            other => panic!("expected Generation, got {other:?}"),
        }
    }

    #[test]
    fn test_for_stage_preserves_existing_attribution() {
        let inner = PipelineError::Generation {
            stage: "research".into(),
            message: "no candidates".into(),
        };
        let err = PipelineError::for_stage("draft", inner);
        match err {
            PipelineError::Generation { stage, .. } => assert_eq!(stage, "research"),
            other => panic!("expected Generation, got {other:?}"),
        }
    }

    #[test]
    fn test_display_includes_stage_name() {
        let err = PipelineError::Generation {
            stage: "edit".into(),
            message: "score out of range".into(),
        };
        assert_eq!(err.to_string(), "Stage 'edit' failed: score out of range");
    }
}
