//! Append-only run log.
//!
//! [`RunLog`] accumulates timestamped [`LogEntry`] records as the runner
//! moves through its stages. Entries are only ever appended — in the
//! causal order of stage execution — and the whole sequence is cleared
//! on pipeline reset. The UI renders it as a plain list, newest last.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a log entry records about its stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    /// The stage began executing.
    Started,
    /// The stage produced a result.
    Completed,
    /// The stage was skipped; the message carries the reason.
    Skipped,
    /// The stage failed; the message carries the error.
    Failed,
}

/// One timestamped progress record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unique id, fresh per entry.
    pub id: Uuid,

    /// Name of the stage the entry refers to.
    pub stage: String,

    /// Lifecycle kind.
    pub kind: LogKind,

    /// Human-readable message.
    pub message: String,

    /// UTC time the entry was appended.
    pub timestamp: DateTime<Utc>,
}

/// Ordered, append-only sequence of log entries for one pipeline.
#[derive(Debug, Default)]
pub struct RunLog {
    entries: Vec<LogEntry>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry with a fresh id and the current UTC time.
    pub fn append(&mut self, stage: &str, kind: LogKind, message: impl Into<String>) {
        self.entries.push(LogEntry {
            id: Uuid::new_v4(),
            stage: stage.to_string(),
            kind,
            message: message.into(),
            timestamp: Utc::now(),
        });
    }

    /// All entries, in insertion order.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. Called on pipeline reset only.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
