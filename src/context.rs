//! Accumulated context for one pipeline run.
//!
//! [`StageContext`] holds the serialized brief plus every stage result
//! recorded so far, keyed by stage name in execution order. Each stage
//! reads whatever upstream output it needs and the runner appends the
//! stage's own result after it succeeds.

use crate::error::{PipelineError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// One recorded stage result.
#[derive(Debug, Clone, Serialize)]
pub struct StageRecord {
    /// Name of the stage that produced the value.
    pub stage: String,

    /// The stage's JSON result.
    pub value: Value,
}

/// Brief plus ordered stage results for one run.
#[derive(Debug, Clone, Default)]
pub struct StageContext {
    brief: Value,
    records: Vec<StageRecord>,
}

impl StageContext {
    /// Create a context around an already-serialized brief.
    pub fn new(brief: Value) -> Self {
        Self {
            brief,
            records: Vec::new(),
        }
    }

    /// The serialized brief this run was started with.
    pub fn brief(&self) -> &Value {
        &self.brief
    }

    /// Deserialize the brief into its concrete type.
    pub fn brief_as<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.brief.clone()).map_err(PipelineError::Json)
    }

    /// Record a stage result. Called by the runner after stage success.
    pub fn record(&mut self, stage: &str, value: Value) {
        self.records.push(StageRecord {
            stage: stage.to_string(),
            value,
        });
    }

    /// All records in execution order.
    pub fn records(&self) -> &[StageRecord] {
        &self.records
    }

    /// The raw result of a named stage, if it has run.
    pub fn get(&self, stage: &str) -> Option<&Value> {
        self.records
            .iter()
            .find(|r| r.stage == stage)
            .map(|r| &r.value)
    }

    /// The typed result of a named stage.
    ///
    /// Fails when the stage has not recorded a result or the recorded
    /// value does not match `T` — both indicate the upstream stage did
    /// not deliver what this one depends on.
    pub fn require_as<T: DeserializeOwned>(&self, stage: &str) -> Result<T> {
        let value = self.get(stage).ok_or_else(|| PipelineError::Generation {
            stage: stage.to_string(),
            message: "no result recorded for this stage".to_string(),
        })?;
        serde_json::from_value(value.clone()).map_err(|e| PipelineError::Generation {
            stage: stage.to_string(),
            message: format!("recorded result has unexpected shape: {e}"),
        })
    }

    /// Names of the stages that have recorded results, in order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.stage.as_str()).collect()
    }

    /// Drop every record and the brief. Called on pipeline reset only.
    pub fn clear(&mut self) {
        self.brief = Value::Null;
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_records_keep_execution_order() {
        let mut ctx = StageContext::new(json!({"topic": "AI"}));
        ctx.record("research", json!({"key_points": ["a"]}));
        ctx.record("draft", json!({"title": "AI"}));
        assert_eq!(ctx.stage_names(), vec!["research", "draft"]);
    }

    #[test]
    fn test_get_by_stage_name() {
        let mut ctx = StageContext::new(Value::Null);
        ctx.record("edit", json!({"overall_score": 88.0}));
        assert_eq!(ctx.get("edit").unwrap()["overall_score"], 88.0);
        assert!(ctx.get("publish").is_none());
    }

    #[test]
    fn test_require_as_typed() {
        #[derive(serde::Deserialize)]
        struct Review {
            overall_score: f64,
        }

        let mut ctx = StageContext::new(Value::Null);
        ctx.record("edit", json!({"overall_score": 91.5}));

        let review: Review = ctx.require_as("edit").unwrap();
        assert!((review.overall_score - 91.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_require_as_missing_stage_fails() {
        let ctx = StageContext::new(Value::Null);
        let result: Result<Value> = ctx.require_as("publish");
        match result.unwrap_err() {
            PipelineError::Generation { stage, .. } => assert_eq!(stage, "publish"),
            other => panic!("expected Generation, got {other:?}"),
        }
    }

    #[test]
    fn test_require_as_shape_mismatch_fails() {
        #[derive(serde::Deserialize)]
        #[allow(dead_code)]
        struct Draft {
            title: String,
        }

        let mut ctx = StageContext::new(Value::Null);
        ctx.record("draft", json!({"heading": "wrong shape"}));
        assert!(ctx.require_as::<Draft>("draft").is_err());
    }

    #[test]
    fn test_brief_round_trip() {
        #[derive(serde::Deserialize)]
        struct Brief {
            topic: String,
        }

        let ctx = StageContext::new(json!({"topic": "Quantum Computing"}));
        let brief: Brief = ctx.brief_as().unwrap();
        assert_eq!(brief.topic, "Quantum Computing");
    }

    #[test]
    fn test_clear_discards_everything() {
        let mut ctx = StageContext::new(json!({"topic": "AI"}));
        ctx.record("research", json!({}));
        ctx.clear();
        assert!(ctx.records().is_empty());
        assert_eq!(ctx.brief(), &Value::Null);
    }
}
