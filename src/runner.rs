//! Pipeline runner — sequential stage execution.
//!
//! [`PipelineRunner`] drives a fixed, ordered list of stages: it
//! validates the brief, then executes each stage to completion before
//! the next starts, threading the accumulated [`StageContext`] forward
//! and appending one log entry per lifecycle transition. Any stage
//! failure ends the run; earlier results stay visible in the snapshot.

use crate::brief::Brief;
use crate::client::GenClient;
use crate::context::StageContext;
use crate::error::{PipelineError, Result};
use crate::log::{LogKind, RunLog};
use crate::progress::{emit, ProgressEvent, ProgressHandler};
use crate::stage::{Stage, StagePlan};
use crate::state::{PipelineSnapshot, PipelineState};
use std::sync::Arc;

/// Sequential executor for a fixed list of stages.
///
/// The stage list is assembled at build time and never changes at
/// runtime. One runner serves one pipeline; a finished run must be
/// explicitly [`reset`](Self::reset) before the next.
pub struct PipelineRunner {
    name: String,
    stages: Vec<Arc<dyn Stage>>,
    handler: Option<Arc<dyn ProgressHandler>>,
    state: PipelineState,
    context: StageContext,
    log: RunLog,
}

impl std::fmt::Debug for PipelineRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineRunner")
            .field("name", &self.name)
            .field(
                "stages",
                &self.stages.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("state", &self.state)
            .field("log_entries", &self.log.len())
            .finish()
    }
}

impl PipelineRunner {
    /// Create a new builder for a named pipeline.
    pub fn builder(name: impl Into<String>) -> PipelineRunnerBuilder {
        PipelineRunnerBuilder {
            name: name.into(),
            stages: Vec::new(),
            handler: None,
        }
    }

    /// Pipeline name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state marker.
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// The append-only run log.
    pub fn log(&self) -> &RunLog {
        &self.log
    }

    /// The accumulated context, including results of a failed run's
    /// earlier stages.
    pub fn context(&self) -> &StageContext {
        &self.context
    }

    /// Names of the configured stages, in execution order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Everything a UI needs to render this pipeline right now.
    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            state: self.state.clone(),
            logs: self.log.entries().to_vec(),
            results: self.context.records().to_vec(),
        }
    }

    /// Clear results and logs and return to `Idle`, from any state.
    pub fn reset(&mut self) {
        tracing::debug!(pipeline = %self.name, "pipeline reset");
        self.state = PipelineState::Idle;
        self.context.clear();
        self.log.clear();
    }

    /// Execute all stages in order against the given brief.
    ///
    /// The brief is validated first; on validation failure the state
    /// stays `Idle` and no stage runs. Afterwards each stage either
    /// runs to completion, is declaratively skipped (with a logged
    /// reason and no provider call), or fails — ending the run in the
    /// terminal `Failed` state with all earlier results retained.
    pub async fn run<B: Brief>(&mut self, client: &GenClient, brief: &B) -> Result<()> {
        if !self.state.is_idle() {
            return Err(PipelineError::Pipeline(format!(
                "pipeline '{}' is not idle; reset it before starting a new run",
                self.name
            )));
        }

        brief.validate().map_err(PipelineError::Configuration)?;
        self.context = StageContext::new(serde_json::to_value(brief)?);

        for index in 0..self.stages.len() {
            let stage = Arc::clone(&self.stages[index]);
            let name = stage.name().to_string();

            match stage.plan(&self.context) {
                StagePlan::Skip(reason) => {
                    tracing::info!(pipeline = %self.name, stage = %name, %reason, "stage skipped");
                    self.log
                        .append(&name, LogKind::Skipped, format!("Skipped: {reason}"));
                    emit(
                        &self.handler,
                        ProgressEvent::StageSkipped {
                            stage: name,
                            reason,
                        },
                    );
                    continue;
                }
                StagePlan::Run => {}
            }

            self.state = PipelineState::Running {
                index,
                stage: name.clone(),
            };
            tracing::info!(pipeline = %self.name, stage = %name, "stage started");
            self.log.append(&name, LogKind::Started, stage.describe());
            emit(
                &self.handler,
                ProgressEvent::StageStarted {
                    stage: name.clone(),
                    description: stage.describe().to_string(),
                },
            );

            let outcome = stage.run(client, &self.context).await;
            match outcome {
                Ok(value) => {
                    self.context.record(&name, value);
                    tracing::info!(pipeline = %self.name, stage = %name, "stage completed");
                    self.log
                        .append(&name, LogKind::Completed, format!("'{name}' completed"));
                    emit(&self.handler, ProgressEvent::StageCompleted { stage: name });
                }
                Err(e) => {
                    let err = PipelineError::for_stage(&name, e);
                    let message = err.to_string();
                    tracing::error!(pipeline = %self.name, stage = %name, error = %message, "stage failed");
                    self.state = PipelineState::Failed {
                        stage: name.clone(),
                        message: message.clone(),
                    };
                    self.log.append(&name, LogKind::Failed, message.clone());
                    emit(
                        &self.handler,
                        ProgressEvent::StageFailed {
                            stage: name,
                            message,
                        },
                    );
                    emit(&self.handler, ProgressEvent::PipelineFinished { ok: false });
                    return Err(err);
                }
            }
        }

        self.state = PipelineState::Complete;
        tracing::info!(pipeline = %self.name, "pipeline complete");
        emit(&self.handler, ProgressEvent::PipelineFinished { ok: true });
        Ok(())
    }
}

/// Builder for [`PipelineRunner`].
pub struct PipelineRunnerBuilder {
    name: String,
    stages: Vec<Arc<dyn Stage>>,
    handler: Option<Arc<dyn ProgressHandler>>,
}

impl PipelineRunnerBuilder {
    /// Append a stage to the pipeline.
    pub fn add_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Attach a progress handler.
    pub fn progress_handler(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Build the runner, validating configuration.
    pub fn build(self) -> Result<PipelineRunner> {
        if self.stages.is_empty() {
            return Err(PipelineError::Pipeline(format!(
                "pipeline '{}' must have at least one stage",
                self.name
            )));
        }
        Ok(PipelineRunner {
            name: self.name,
            stages: self.stages,
            handler: self.handler,
            state: PipelineState::Idle,
            context: StageContext::default(),
            log: RunLog::new(),
        })
    }
}
