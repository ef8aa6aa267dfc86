//! Append-only decision log sinks.
//!
//! Appends are fire-and-forget: a failing sink is reported through
//! `tracing` and never affects the decision being made.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::{debug, warn};

use super::types::LogRecord;

/// Receiver of decision log records.
///
/// Implementations must serialize concurrent appends themselves.
pub trait DecisionSink: Send + Sync {
    /// Persist one record stamped with the current UTC time.
    fn append(&self, event: &str, details: Value);
}

impl<T: DecisionSink + ?Sized> DecisionSink for Arc<T> {
    fn append(&self, event: &str, details: Value) {
        (**self).append(event, details)
    }
}

/// JSON-lines file sink. One record per line, opened in append mode.
pub struct JsonlDecisionLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlDecisionLog {
    /// Open (creating if needed) the log at `path`.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DecisionSink for JsonlDecisionLog {
    fn append(&self, event: &str, details: Value) {
        let record = LogRecord::now(event, details);
        let line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(e) => {
                warn!(event, "Failed to serialize decision log record: {e}");
                return;
            }
        };
        let mut file = match self.file.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match writeln!(file, "{line}").and_then(|_| file.flush()) {
            Ok(()) => debug!(event, path = %self.path.display(), "Appended decision log record"),
            Err(e) => warn!(event, path = %self.path.display(), "Failed to append decision log record: {e}"),
        }
    }
}

/// In-memory sink for embedding hosts and tests.
#[derive(Debug, Default)]
pub struct MemoryDecisionLog {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryDecisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records appended so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Event names in append order.
    pub fn event_names(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|r| r.event.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DecisionSink for MemoryDecisionLog {
    fn append(&self, event: &str, details: Value) {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(LogRecord::now(event, details));
    }
}
