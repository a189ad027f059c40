//! Core stage trait.
//!
//! A stage is one ordered unit of work in a pipeline, backed by exactly
//! one provider call. Stages are object-safe so the runner can hold a
//! fixed `Vec<Arc<dyn Stage>>` assembled at build time.

use crate::client::GenClient;
use crate::context::StageContext;
use crate::error::Result;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

/// A boxed, pinned, Send future — the return type of [`Stage::run`].
pub type BoxFut<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A stage's decision about whether it should execute, made against the
/// accumulated context before any network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagePlan {
    /// Execute the stage.
    Run,
    /// Skip the stage entirely; the reason is logged and no provider
    /// call is made.
    Skip(String),
}

/// One ordered unit of work in a generation pipeline.
///
/// Each implementation wraps exactly one provider call: it renders a
/// fixed prompt from the accumulated context, calls the provider via
/// the shared [`GenClient`], validates the response, and returns the
/// stage's JSON result for the runner to record.
pub trait Stage: Send + Sync {
    /// Stable stage name — the key its result is recorded under.
    fn name(&self) -> &str;

    /// Human-readable description, used for the start log entry.
    fn describe(&self) -> &str;

    /// Whether the stage should run given the context so far.
    ///
    /// The default is to always run; conditional stages override this
    /// to declare their precondition.
    fn plan(&self, _ctx: &StageContext) -> StagePlan {
        StagePlan::Run
    }

    /// Execute the stage. Must resolve with a value matching the
    /// stage's expected shape, or reject.
    fn run<'a>(&'a self, client: &'a GenClient, ctx: &'a StageContext)
        -> BoxFut<'a, Result<Value>>;
}
