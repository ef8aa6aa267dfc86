//! Phase events of one classification episode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fallback::FallbackStage;

/// Every phase transition the orchestrator records, in emission order:
/// `inference`, `confidence_check`, then either `final_decision`, or
/// `fallback_trigger`, `fallback_result`, `final_decision`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "details", rename_all = "snake_case")]
pub enum DecisionEvent {
    /// Primary model produced a prediction
    Inference {
        input_text: String,
        predicted_label: String,
        confidence: f64,
    },

    /// Confidence gate evaluated the prediction
    ConfidenceCheck {
        predicted_label: String,
        confidence: f64,
        threshold: f64,
        result: bool,
        message: String,
    },

    /// Gate rejected; the fallback chain is about to run
    FallbackTrigger {
        predicted_label: String,
        confidence: f64,
    },

    /// Fallback chain produced a label
    FallbackResult {
        final_label: String,
        reason: String,
        stage: FallbackStage,
    },

    /// Terminal decision of the episode
    FinalDecision {
        final_label: String,
        accepted: bool,
        reason: String,
    },
}

impl DecisionEvent {
    /// Event name as written to the log.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Inference { .. } => "inference",
            Self::ConfidenceCheck { .. } => "confidence_check",
            Self::FallbackTrigger { .. } => "fallback_trigger",
            Self::FallbackResult { .. } => "fallback_result",
            Self::FinalDecision { .. } => "final_decision",
        }
    }

    /// Event payload as a JSON object.
    pub fn details(&self) -> Value {
        match serde_json::to_value(self) {
            Ok(Value::Object(mut map)) => map.remove("details").unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }

    /// Whether this event ends an episode.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::FinalDecision { .. })
    }
}

/// One persisted line of the decision log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// UTC, RFC 3339
    pub timestamp: DateTime<Utc>,
    pub event: String,
    pub details: Value,
}

impl LogRecord {
    /// Stamp an event with the current UTC time.
    pub fn now(event: &str, details: Value) -> Self {
        Self {
            timestamp: Utc::now(),
            event: event.to_string(),
            details,
        }
    }

    /// Parse back into a typed event, if the name and payload are known.
    pub fn to_event(&self) -> Option<DecisionEvent> {
        let tagged = serde_json::json!({
            "event": self.event,
            "details": self.details,
        });
        serde_json::from_value(tagged).ok()
    }
}
