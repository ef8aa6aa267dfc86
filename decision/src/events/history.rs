//! Reading decision logs back for analysis.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::types::{DecisionEvent, LogRecord};
use crate::error::{HistoryError, HistoryResult};

/// Parsed contents of a JSONL decision log.
#[derive(Debug, Clone, Default)]
pub struct DecisionHistory {
    records: Vec<LogRecord>,
}

impl DecisionHistory {
    /// Read every record from a JSONL log. Blank lines are ignored.
    pub fn read_from_file(path: &Path) -> HistoryResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        let mut records = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: LogRecord = serde_json::from_str(&line).map_err(|source| {
                HistoryError::Parse {
                    line: idx + 1,
                    source,
                }
            })?;
            records.push(record);
        }
        Ok(Self { records })
    }

    pub fn from_records(records: Vec<LogRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    /// Aggregate statistics over all complete episodes.
    ///
    /// Model confidence comes from the `inference` event preceding each
    /// `final_decision`.
    pub fn stats(&self) -> DecisionStats {
        let mut stats = DecisionStats::default();
        let mut pending_confidence: Option<f64> = None;
        let mut confidence_sum = 0.0;
        let mut confidence_count = 0usize;

        for event in self.records.iter().filter_map(LogRecord::to_event) {
            match event {
                DecisionEvent::Inference { confidence, .. } => {
                    pending_confidence = Some(confidence);
                }
                DecisionEvent::FinalDecision {
                    accepted,
                    reason,
                    final_label,
                } => {
                    stats.episodes += 1;
                    if accepted {
                        stats.accepted += 1;
                    } else {
                        stats.fallbacks += 1;
                    }
                    *stats.by_reason.entry(reason).or_insert(0) += 1;
                    *stats.by_label.entry(final_label).or_insert(0) += 1;
                    if let Some(c) = pending_confidence.take() {
                        confidence_sum += c;
                        confidence_count += 1;
                    }
                }
                DecisionEvent::ConfidenceCheck { .. }
                | DecisionEvent::FallbackTrigger { .. }
                | DecisionEvent::FallbackResult { .. } => {}
            }
        }

        if stats.episodes > 0 {
            stats.acceptance_rate = stats.accepted as f64 / stats.episodes as f64;
        }
        if confidence_count > 0 {
            stats.mean_confidence = confidence_sum / confidence_count as f64;
        }
        stats
    }
}

/// Aggregate view of a decision log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionStats {
    /// Episodes with a `final_decision` record
    pub episodes: usize,
    /// Accepted by the confidence gate
    pub accepted: usize,
    /// Resolved through the fallback chain
    pub fallbacks: usize,
    pub acceptance_rate: f64,
    /// Mean original model confidence
    pub mean_confidence: f64,
    pub by_reason: BTreeMap<String, usize>,
    pub by_label: BTreeMap<String, usize>,
}

impl DecisionStats {
    /// Multi-line human summary.
    pub fn render(&self) -> String {
        let mut out = format!(
            "episodes: {}\naccepted: {}\nfallbacks: {}\nacceptance rate: {:.1}%\nmean model confidence: {:.1}%\n",
            self.episodes,
            self.accepted,
            self.fallbacks,
            self.acceptance_rate * 100.0,
            self.mean_confidence * 100.0
        );
        if !self.by_label.is_empty() {
            out.push_str("labels:\n");
            for (label, count) in &self.by_label {
                out.push_str(&format!("  {label}: {count}\n"));
            }
        }
        if !self.by_reason.is_empty() {
            out.push_str("reasons:\n");
            for (reason, count) in &self.by_reason {
                out.push_str(&format!("  {reason}: {count}\n"));
            }
        }
        out
    }
}
