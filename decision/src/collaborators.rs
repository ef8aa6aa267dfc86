//! Collaborator seams for the decision core.
//!
//! The core never touches models, terminals or HTTP directly. Hosts inject
//! implementations of these traits; tests inject fakes.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{InferenceError, ZeroShotError};
use crate::labels::CandidateLabels;

/// Top prediction from the primary model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    /// Probability mass on `label`, in `[0, 1]`
    pub confidence: f64,
}

impl Prediction {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Ranked output of a zero-shot classifier, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroShotRanking {
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
}

impl ZeroShotRanking {
    /// Top label and its score. `None` unless both are present.
    pub fn top(&self) -> Option<(&str, f64)> {
        let label = self.labels.first()?;
        let score = self.scores.first().copied()?;
        Some((label.as_str(), score))
    }
}

/// Primary classification model.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InferenceModel: Send + Sync {
    /// Predict the top label and its confidence for `text`.
    async fn predict(&self, text: &str) -> Result<Prediction, InferenceError>;

    /// Label vocabulary ordered by class index.
    fn labels(&self) -> Vec<String>;
}

/// Secondary general-purpose classifier scored against caller-supplied labels.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ZeroShotClassifier: Send + Sync {
    async fn classify(
        &self,
        text: &str,
        candidate_labels: &CandidateLabels,
    ) -> Result<ZeroShotRanking, ZeroShotError>;
}

/// Source of interactive answers.
///
/// Always returns, possibly with empty text. Blocks (awaits) until an answer
/// is available; there is no timeout.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InputProvider: Send + Sync {
    async fn ask(&self, prompt: &str) -> String;
}

/// Optional secondary classifier, modelled as an explicit present/absent variant.
#[derive(Clone, Default)]
pub enum SecondaryClassifier {
    Available(Arc<dyn ZeroShotClassifier>),
    #[default]
    Unavailable,
}

impl SecondaryClassifier {
    pub fn available(classifier: Arc<dyn ZeroShotClassifier>) -> Self {
        Self::Available(classifier)
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

impl std::fmt::Debug for SecondaryClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available(_) => write!(f, "SecondaryClassifier::Available"),
            Self::Unavailable => write!(f, "SecondaryClassifier::Unavailable"),
        }
    }
}

impl From<Option<Arc<dyn ZeroShotClassifier>>> for SecondaryClassifier {
    fn from(value: Option<Arc<dyn ZeroShotClassifier>>) -> Self {
        match value {
            Some(classifier) => Self::Available(classifier),
            None => Self::Unavailable,
        }
    }
}

/// Input provider that replays a fixed list of answers, then answers empty.
///
/// Records every prompt it was asked so hosts and tests can inspect the
/// conversation afterwards.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    answers: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedInput {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts asked so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Answers not yet consumed.
    pub fn remaining(&self) -> usize {
        self.answers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

#[async_trait]
impl InputProvider for ScriptedInput {
    async fn ask(&self, prompt: &str) -> String {
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(prompt.to_string());
        self.answers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .unwrap_or_default()
    }
}

/// Input provider for non-interactive hosts: every prompt gets an empty answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclineInput;

#[async_trait]
impl InputProvider for DeclineInput {
    async fn ask(&self, _prompt: &str) -> String {
        String::new()
    }
}
