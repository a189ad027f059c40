//! Pipeline run state.
//!
//! State moves strictly forward: `Idle` → `Running` (per stage) →
//! `Complete` or `Failed`. Both end states are terminal; the only way
//! back to `Idle` is an explicit reset, which also discards results
//! and logs.

use crate::context::StageRecord;
use crate::log::LogEntry;
use serde::Serialize;

/// Where a pipeline currently is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PipelineState {
    /// No run in progress. The only state a run may start from.
    Idle,

    /// A stage is executing.
    Running {
        /// Zero-based position of the stage in the pipeline.
        index: usize,
        /// Name of the executing stage.
        stage: String,
    },

    /// Every stage ran or was explicitly skipped. Terminal.
    Complete,

    /// A stage failed and no later stage executed. Terminal.
    Failed {
        /// Name of the stage that failed.
        stage: String,
        /// The surfaced error message.
        message: String,
    },
}

impl PipelineState {
    pub fn is_idle(&self) -> bool {
        matches!(self, PipelineState::Idle)
    }

    /// Whether the run is over, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Complete | PipelineState::Failed { .. })
    }

    /// The error message, when in the `Failed` state.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            PipelineState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Everything a UI needs to render one pipeline: current state, the
/// ordered log, and all stage results recorded so far.
///
/// On failure the records of earlier stages stay visible — a snapshot
/// taken after an error still carries every result produced before it.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineSnapshot {
    /// Current state marker.
    pub state: PipelineState,

    /// Append-only log, oldest first.
    pub logs: Vec<LogEntry>,

    /// Stage results in execution order.
    pub results: Vec<StageRecord>,
}

impl PipelineSnapshot {
    /// The error message, if the pipeline failed.
    pub fn error(&self) -> Option<&str> {
        self.state.error_message()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert!(PipelineState::default().is_idle());
    }

    #[test]
    fn test_terminal_states() {
        assert!(PipelineState::Complete.is_terminal());
        assert!(PipelineState::Failed {
            stage: "draft".into(),
            message: "boom".into()
        }
        .is_terminal());
        assert!(!PipelineState::Idle.is_terminal());
        assert!(!PipelineState::Running {
            index: 0,
            stage: "research".into()
        }
        .is_terminal());
    }

    #[test]
    fn test_error_message_only_on_failure() {
        let failed = PipelineState::Failed {
            stage: "edit".into(),
            message: "no candidates".into(),
        };
        assert_eq!(failed.error_message(), Some("no candidates"));
        assert!(PipelineState::Complete.error_message().is_none());
    }

    #[test]
    fn test_state_serializes_tagged() {
        let running = PipelineState::Running {
            index: 2,
            stage: "edit".into(),
        };
        let json = serde_json::to_value(&running).unwrap();
        assert_eq!(json["state"], "running");
        assert_eq!(json["index"], 2);
        assert_eq!(json["stage"], "edit");
    }
}
