//! Label vocabulary and user-reply normalization.

use serde::{Deserialize, Serialize};

/// Canonical negative label
pub const NEGATIVE: &str = "NEGATIVE";
/// Canonical positive label
pub const POSITIVE: &str = "POSITIVE";

/// Replies recognised as the negative label (after trim + lowercase)
const NEGATIVE_TOKENS: &[&str] = &["negative", "neg", "n"];
/// Replies recognised as the positive label (after trim + lowercase)
const POSITIVE_TOKENS: &[&str] = &["positive", "pos", "p"];
/// Reply that defers to the next fallback stage
const SKIP_TOKEN: &str = "skip";

/// Ordered, de-duplicated set of labels the fallback chain may return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateLabels(Vec<String>);

impl CandidateLabels {
    /// Build from a label vocabulary, keeping first occurrence order.
    ///
    /// An empty vocabulary yields the canonical `[NEGATIVE, POSITIVE]` pair.
    pub fn from_vocabulary<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for label in labels {
            let label = label.into();
            if !label.is_empty() && !out.contains(&label) {
                out.push(label);
            }
        }
        if out.is_empty() {
            return Self::canonical();
        }
        Self(out)
    }

    /// The two canonical sentiment labels.
    pub fn canonical() -> Self {
        Self(vec![NEGATIVE.to_string(), POSITIVE.to_string()])
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|l| l == label)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for CandidateLabels {
    fn default() -> Self {
        Self::canonical()
    }
}

/// A user's reply to the clarification prompt, classified by exact token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clarification {
    /// Reply named the negative label
    Negative,
    /// Reply named the positive label
    Positive,
    /// User asked to defer to the next stage
    Skip,
    /// Nothing typed
    Empty,
    /// Anything else; treated as new evidence
    FreeText(String),
}

impl Clarification {
    /// Classify a raw reply. Only whole normalized tokens count as labels;
    /// "not negative at all" is free text, not a negative label.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        let lowered = trimmed.to_lowercase();
        if NEGATIVE_TOKENS.contains(&lowered.as_str()) {
            Self::Negative
        } else if POSITIVE_TOKENS.contains(&lowered.as_str()) {
            Self::Positive
        } else if lowered == SKIP_TOKEN {
            Self::Skip
        } else {
            Self::FreeText(trimmed.to_string())
        }
    }
}

/// Normalize a forced-choice reply to one of the canonical labels.
pub fn canonical_label(raw: &str) -> Option<&'static str> {
    match raw.trim().to_uppercase().as_str() {
        NEGATIVE => Some(NEGATIVE),
        POSITIVE => Some(POSITIVE),
        _ => None,
    }
}
