//! Progress events for UI observation.
//!
//! The runner emits one event per stage lifecycle transition. Handlers
//! are entirely optional — the pipeline works without one — and exist
//! so a UI can re-render current stage and log state as a run advances.

use std::sync::Arc;

/// Events emitted by the runner during a pipeline run.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// A stage has started executing.
    StageStarted {
        /// Stage name.
        stage: String,
        /// Human-readable description of what the stage does.
        description: String,
    },
    /// A stage stored its result and the runner is advancing.
    StageCompleted {
        /// Stage name.
        stage: String,
    },
    /// A stage's precondition was not met and it was skipped.
    StageSkipped {
        /// Stage name.
        stage: String,
        /// Why the stage did not run.
        reason: String,
    },
    /// A stage failed; the run is over.
    StageFailed {
        /// Stage name.
        stage: String,
        /// The surfaced error message.
        message: String,
    },
    /// The run reached a terminal state.
    PipelineFinished {
        /// Whether every stage ran or was explicitly skipped.
        ok: bool,
    },
}

/// Handler for pipeline progress events.
///
/// # Example
///
/// ```
/// use studio_pipeline::progress::{ProgressEvent, ProgressHandler};
///
/// struct PrintHandler;
///
/// impl ProgressHandler for PrintHandler {
///     fn on_event(&self, event: ProgressEvent) {
///         match event {
///             ProgressEvent::StageStarted { stage, .. } => println!("[start] {}", stage),
///             ProgressEvent::StageCompleted { stage } => println!("[done] {}", stage),
///             _ => {}
///         }
///     }
/// }
/// ```
pub trait ProgressHandler: Send + Sync {
    /// Called once per emitted event, on the runner's task.
    fn on_event(&self, event: ProgressEvent);
}

/// Emit an event if a handler is present. No-op otherwise.
pub(crate) fn emit(handler: &Option<Arc<dyn ProgressHandler>>, event: ProgressEvent) {
    if let Some(ref h) = handler {
        h.on_event(event);
    }
}

/// A [`ProgressHandler`] backed by a closure.
pub struct FnProgressHandler<F: Fn(ProgressEvent) + Send + Sync>(pub F);

impl<F: Fn(ProgressEvent) + Send + Sync> ProgressHandler for FnProgressHandler<F> {
    fn on_event(&self, event: ProgressEvent) {
        (self.0)(event);
    }
}
