//! Fallback Resolver: the escalation chain that repairs a rejected prediction.
//!
//! ```text
//! UserClarification (ask_user, ask_then_zero_shot)
//!     ├─ "neg"/"pos" tokens        → label, done
//!     ├─ free text                 → zero-shot on the reply, or lexical heuristic, done
//!     └─ "skip" / empty            → fall through
//!     ▼
//! SecondaryClassifier (zero_shot, ask_then_zero_shot)
//!     ├─ classifier answers        → top label on the ORIGINAL text, done
//!     └─ absent / failing          → fall through
//!     ▼
//! ForcedChoice (always)
//!     ├─ NEGATIVE / POSITIVE       → label, done
//!     └─ anything else             → NEGATIVE default, done
//! ```
//!
//! Every path ends with a label and a non-empty reason.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::collaborators::{InputProvider, SecondaryClassifier};
use crate::fallback::heuristics;
use crate::fallback::strategy::{FallbackStage, FallbackStrategy};
use crate::labels::{canonical_label, CandidateLabels, Clarification, NEGATIVE, POSITIVE};

/// Prompt for the clarification stage
pub const CLARIFY_PROMPT: &str = "Could you clarify your intent? (e.g. Was the review negative, positive, neutral?)\nUser (type label or free text; type 'skip' to skip): ";
/// Prompt for the forced-choice stage
pub const FORCED_CHOICE_PROMPT: &str =
    "Please type the correct label now (NEGATIVE / POSITIVE):\nFinal label: ";

pub const USER_CORRECTION_REASON: &str = "Corrected by user clarification";
pub const EXPLICIT_LABEL_REASON: &str = "Explicit user-provided final label";
pub const DEFAULT_FALLBACK_REASON: &str = "Default fallback - chose NEGATIVE";

/// Label and justification produced by the escalation chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackOutcome {
    pub label: String,
    /// Which step produced the label; never empty
    pub reason: String,
    pub stage: FallbackStage,
}

impl FallbackOutcome {
    fn new(label: impl Into<String>, reason: impl Into<String>, stage: FallbackStage) -> Self {
        Self {
            label: label.into(),
            reason: reason.into(),
            stage,
        }
    }
}

/// Result of attempting one optional stage.
#[derive(Debug)]
enum StageResult {
    Resolved(FallbackOutcome),
    FellThrough(&'static str),
}

/// Runs the escalation chain for one rejected prediction.
pub struct FallbackResolver {
    strategy: FallbackStrategy,
    input: Arc<dyn InputProvider>,
    secondary: SecondaryClassifier,
}

impl FallbackResolver {
    pub fn new(
        strategy: FallbackStrategy,
        input: Arc<dyn InputProvider>,
        secondary: SecondaryClassifier,
    ) -> Self {
        Self {
            strategy,
            input,
            secondary,
        }
    }

    pub fn strategy(&self) -> FallbackStrategy {
        self.strategy
    }

    /// Resolve a final label for `text`. Always terminates with an outcome.
    pub async fn resolve(&self, text: &str, candidate_labels: &CandidateLabels) -> FallbackOutcome {
        for stage in self.strategy.stages() {
            let result = match stage {
                FallbackStage::UserClarification => self.user_clarification(candidate_labels).await,
                FallbackStage::SecondaryClassifier => {
                    self.secondary_classifier(text, candidate_labels).await
                }
                FallbackStage::ForcedChoice => break,
            };
            match result {
                StageResult::Resolved(outcome) => {
                    info!(stage = %stage, label = %outcome.label, reason = %outcome.reason, "Fallback resolved");
                    return outcome;
                }
                StageResult::FellThrough(why) => {
                    debug!(stage = %stage, why, "Fallback stage fell through");
                }
            }
        }
        let outcome = self.forced_choice().await;
        info!(stage = %outcome.stage, label = %outcome.label, reason = %outcome.reason, "Fallback resolved");
        outcome
    }

    async fn user_clarification(&self, candidate_labels: &CandidateLabels) -> StageResult {
        let reply = self.input.ask(CLARIFY_PROMPT).await;
        match Clarification::parse(&reply) {
            Clarification::Negative => StageResult::Resolved(FallbackOutcome::new(
                NEGATIVE,
                USER_CORRECTION_REASON,
                FallbackStage::UserClarification,
            )),
            Clarification::Positive => StageResult::Resolved(FallbackOutcome::new(
                POSITIVE,
                USER_CORRECTION_REASON,
                FallbackStage::UserClarification,
            )),
            Clarification::Skip => StageResult::FellThrough("user skipped"),
            Clarification::Empty => StageResult::FellThrough("empty reply"),
            Clarification::FreeText(free_text) => {
                info!("Interpreting user clarification as new evidence");
                StageResult::Resolved(self.interpret_free_text(&free_text, candidate_labels).await)
            }
        }
    }

    /// Free text goes to the secondary classifier when one answers, else to
    /// the lexical heuristic.
    async fn interpret_free_text(
        &self,
        free_text: &str,
        candidate_labels: &CandidateLabels,
    ) -> FallbackOutcome {
        if let Some((label, score)) = self.consult_secondary(free_text, candidate_labels).await {
            return FallbackOutcome::new(
                label.clone(),
                format!(
                    "User free-text clarified; zero-shot interpreted as {} ({:.2})",
                    label, score
                ),
                FallbackStage::UserClarification,
            );
        }
        let (label, reason) = heuristics::interpret(free_text);
        FallbackOutcome::new(label, reason, FallbackStage::UserClarification)
    }

    async fn secondary_classifier(&self, text: &str, candidate_labels: &CandidateLabels) -> StageResult {
        match self.consult_secondary(text, candidate_labels).await {
            Some((label, score)) => StageResult::Resolved(FallbackOutcome::new(
                label.clone(),
                format!("Zero-shot fallback: {} ({:.2})", label, score),
                FallbackStage::SecondaryClassifier,
            )),
            None => StageResult::FellThrough("secondary classifier unavailable"),
        }
    }

    /// Top label and score from the secondary classifier, or `None` when it is
    /// absent, errors, returns nothing, or answers outside the candidate set.
    async fn consult_secondary(
        &self,
        text: &str,
        candidate_labels: &CandidateLabels,
    ) -> Option<(String, f64)> {
        let SecondaryClassifier::Available(classifier) = &self.secondary else {
            return None;
        };
        let ranking = match classifier.classify(text, candidate_labels).await {
            Ok(ranking) => ranking,
            Err(e) => {
                warn!(error = %e, "Secondary classifier failed; skipping");
                return None;
            }
        };
        let Some((label, score)) = ranking.top() else {
            warn!("Secondary classifier returned an empty or unscored ranking; skipping");
            return None;
        };
        if !candidate_labels.contains(label) {
            warn!(label, "Secondary classifier answered outside the candidate labels; skipping");
            return None;
        }
        Some((label.to_string(), score))
    }

    async fn forced_choice(&self) -> FallbackOutcome {
        let reply = self.input.ask(FORCED_CHOICE_PROMPT).await;
        match canonical_label(&reply) {
            Some(label) => {
                FallbackOutcome::new(label, EXPLICIT_LABEL_REASON, FallbackStage::ForcedChoice)
            }
            None => FallbackOutcome::new(NEGATIVE, DEFAULT_FALLBACK_REASON, FallbackStage::ForcedChoice),
        }
    }
}
