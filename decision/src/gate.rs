//! Confidence Gate: accept or escalate a single prediction.
//!
//! This comparison is the only place the accept/escalate branch is decided.
//! Labels produced later by the fallback chain are never re-scored here.

use serde::{Deserialize, Serialize};

/// Outcome of gating one prediction against the configured threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceVerdict {
    /// Whether the prediction is accepted without escalation
    pub accepted: bool,
    /// Human-readable explanation used in the audit log
    pub message: String,
}

/// Accept iff `confidence >= threshold`. Boundary equality accepts.
///
/// Callers guarantee both values lie in `[0, 1]`. The label is carried only
/// for symmetry with the inference result; it does not affect the verdict.
pub fn evaluate(_label: &str, confidence: f64, threshold: f64) -> ConfidenceVerdict {
    let accepted = confidence >= threshold;
    let message = if accepted {
        format!(
            "Confidence ({:.1}%) >= threshold ({:.0}%). Accepting prediction.",
            confidence * 100.0,
            threshold * 100.0
        )
    } else {
        format!(
            "Confidence ({:.1}%) < threshold ({:.0}%). Triggering fallback.",
            confidence * 100.0,
            threshold * 100.0
        )
    };
    ConfidenceVerdict { accepted, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_above_threshold_accepts() {
        let v = evaluate("POSITIVE", 0.92, 0.70);
        assert!(v.accepted);
        assert_eq!(
            v.message,
            "Confidence (92.0%) >= threshold (70%). Accepting prediction."
        );
    }

    #[test]
    fn test_below_threshold_escalates() {
        let v = evaluate("NEGATIVE", 0.55, 0.70);
        assert!(!v.accepted);
        assert_eq!(
            v.message,
            "Confidence (55.0%) < threshold (70%). Triggering fallback."
        );
    }

    #[test]
    fn test_boundary_accepts() {
        assert!(evaluate("POSITIVE", 0.7, 0.7).accepted);
        assert!(evaluate("POSITIVE", 0.0, 0.0).accepted);
        assert!(evaluate("POSITIVE", 1.0, 1.0).accepted);
    }

    #[test]
    fn test_grid_matches_comparison() {
        // 0.00, 0.05, ..., 1.00 on both axes
        for c in 0..=20 {
            for t in 0..=20 {
                let confidence = c as f64 / 20.0;
                let threshold = t as f64 / 20.0;
                assert_eq!(
                    evaluate("X", confidence, threshold).accepted,
                    confidence >= threshold,
                    "confidence={confidence} threshold={threshold}"
                );
            }
        }
    }

    #[test]
    fn test_zero_threshold_accepts_everything() {
        assert!(evaluate("NEGATIVE", 0.0, 0.0).accepted);
        assert!(evaluate("NEGATIVE", 0.01, 0.0).accepted);
    }
}
