//! Decision Orchestrator: inference → confidence gate → fallback → decision.
//!
//! The single public entry point of the decision core. Every phase is
//! appended to the decision log before its consequence is acted upon, so the
//! log is a complete ordered audit trail of each episode.
//!
//! ```text
//! classify(text)
//!   ├─ inference          predict(text)
//!   ├─ confidence_check   gate::evaluate(label, confidence, threshold)
//!   ├─ accepted?  ───────▶ final_decision { accepted: true, reason: "confidence_ok" }
//!   └─ rejected
//!        ├─ fallback_trigger
//!        ├─ fallback_result    FallbackResolver::resolve(text, candidate_labels)
//!        └─ final_decision { accepted: false, reason: outcome.reason }
//! ```
//!
//! No state survives between calls apart from configuration and the log.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::collaborators::{InferenceModel, InputProvider, SecondaryClassifier};
use crate::config::DecisionConfig;
use crate::error::{ConfigError, InferenceError};
use crate::events::{DecisionEvent, DecisionSink};
use crate::fallback::FallbackResolver;
use crate::gate;
use crate::labels::CandidateLabels;

/// Reason recorded when the gate accepts the model's prediction.
pub const CONFIDENCE_OK_REASON: &str = "confidence_ok";

/// Terminal result of one classification episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub final_label: String,
    /// The original model confidence, even when fallback replaced the label
    pub confidence: f64,
    /// Gate verdict on the original prediction
    pub accepted: bool,
    pub reason: String,
}

/// Sequences one inference call, the confidence gate and the fallback chain.
pub struct DecisionOrchestrator {
    config: DecisionConfig,
    inference: Arc<dyn InferenceModel>,
    resolver: FallbackResolver,
    sink: Arc<dyn DecisionSink>,
}

impl DecisionOrchestrator {
    /// Start building an orchestrator around `config`.
    pub fn builder(config: DecisionConfig) -> OrchestratorBuilder {
        OrchestratorBuilder {
            config,
            inference: None,
            input: None,
            secondary: SecondaryClassifier::Unavailable,
            sink: None,
        }
    }

    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }

    /// Classify `text` and return the final decision.
    ///
    /// Only the inference collaborator can fail; once a valid prediction is
    /// in hand every path ends in a `DecisionRecord`.
    pub async fn classify(&self, text: &str) -> Result<DecisionRecord, InferenceError> {
        let prediction = self.inference.predict(text).await?;
        if !prediction.confidence.is_finite() || !(0.0..=1.0).contains(&prediction.confidence) {
            warn!(confidence = prediction.confidence, "Inference returned out-of-range confidence");
            return Err(InferenceError::InvalidConfidence(prediction.confidence));
        }
        let label = prediction.label;
        let confidence = prediction.confidence;

        self.emit(DecisionEvent::Inference {
            input_text: text.to_string(),
            predicted_label: label.clone(),
            confidence,
        });
        info!(label = %label, confidence, "Predicted label");

        let verdict = gate::evaluate(&label, confidence, self.config.threshold);
        self.emit(DecisionEvent::ConfidenceCheck {
            predicted_label: label.clone(),
            confidence,
            threshold: self.config.threshold,
            result: verdict.accepted,
            message: verdict.message.clone(),
        });
        info!("{}", verdict.message);

        if verdict.accepted {
            self.emit(DecisionEvent::FinalDecision {
                final_label: label.clone(),
                accepted: true,
                reason: CONFIDENCE_OK_REASON.to_string(),
            });
            info!(final_label = %label, "Accepted automatically");
            return Ok(DecisionRecord {
                final_label: label,
                confidence,
                accepted: true,
                reason: CONFIDENCE_OK_REASON.to_string(),
            });
        }

        self.emit(DecisionEvent::FallbackTrigger {
            predicted_label: label.clone(),
            confidence,
        });
        info!(strategy = %self.resolver.strategy(), "Confidence too low; triggering fallback");

        let candidate_labels = CandidateLabels::from_vocabulary(self.inference.labels());
        let outcome = self.resolver.resolve(text, &candidate_labels).await;

        self.emit(DecisionEvent::FallbackResult {
            final_label: outcome.label.clone(),
            reason: outcome.reason.clone(),
            stage: outcome.stage,
        });
        self.emit(DecisionEvent::FinalDecision {
            final_label: outcome.label.clone(),
            accepted: false,
            reason: outcome.reason.clone(),
        });
        info!(final_label = %outcome.label, reason = %outcome.reason, "Corrected via fallback");

        Ok(DecisionRecord {
            final_label: outcome.label,
            confidence,
            accepted: false,
            reason: outcome.reason,
        })
    }

    fn emit(&self, event: DecisionEvent) {
        self.sink.append(event.name(), event.details());
    }
}

/// Builder for [`DecisionOrchestrator`]. Validation happens in [`build`](Self::build).
pub struct OrchestratorBuilder {
    config: DecisionConfig,
    inference: Option<Arc<dyn InferenceModel>>,
    input: Option<Arc<dyn InputProvider>>,
    secondary: SecondaryClassifier,
    sink: Option<Arc<dyn DecisionSink>>,
}

impl OrchestratorBuilder {
    pub fn inference(mut self, model: Arc<dyn InferenceModel>) -> Self {
        self.inference = Some(model);
        self
    }

    pub fn input(mut self, input: Arc<dyn InputProvider>) -> Self {
        self.input = Some(input);
        self
    }

    pub fn secondary(mut self, secondary: SecondaryClassifier) -> Self {
        self.secondary = secondary;
        self
    }

    pub fn sink(mut self, sink: Arc<dyn DecisionSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Validate configuration and wire the collaborators.
    pub fn build(self) -> Result<DecisionOrchestrator, ConfigError> {
        self.config.validate()?;
        let inference = self
            .inference
            .ok_or(ConfigError::MissingCollaborator("inference model"))?;
        let input = self
            .input
            .ok_or(ConfigError::MissingCollaborator("input provider"))?;
        let sink = self
            .sink
            .ok_or(ConfigError::MissingCollaborator("decision sink"))?;

        if self.config.strategy.uses_zero_shot() && !self.secondary.is_available() {
            warn!(
                strategy = %self.config.strategy,
                "Strategy includes zero-shot but no secondary classifier is configured; that stage will be skipped"
            );
        }

        Ok(DecisionOrchestrator {
            config: self.config,
            inference,
            resolver: FallbackResolver::new(self.config.strategy, input, self.secondary),
            sink,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{
        MockInferenceModel, MockZeroShotClassifier, Prediction, ScriptedInput, ZeroShotClassifier,
        ZeroShotRanking,
    };
    use crate::events::MemoryDecisionLog;
    use crate::fallback::FallbackStrategy;
    use crate::labels::{NEGATIVE, POSITIVE};

    fn model(label: &'static str, confidence: f64) -> Arc<dyn InferenceModel> {
        let mut mock = MockInferenceModel::new();
        mock.expect_predict()
            .returning(move |_| Ok(Prediction::new(label, confidence)));
        mock.expect_labels()
            .returning(|| vec![NEGATIVE.to_string(), POSITIVE.to_string()]);
        Arc::new(mock)
    }

    fn orchestrator(
        strategy: FallbackStrategy,
        inference: Arc<dyn InferenceModel>,
        answers: &[&str],
        secondary: SecondaryClassifier,
    ) -> (DecisionOrchestrator, Arc<MemoryDecisionLog>, Arc<ScriptedInput>) {
        let log = Arc::new(MemoryDecisionLog::new());
        let input = Arc::new(ScriptedInput::new(answers.iter().copied()));
        let orch = DecisionOrchestrator::builder(DecisionConfig::new(0.70, strategy).unwrap())
            .inference(inference)
            .input(input.clone())
            .secondary(secondary)
            .sink(log.clone())
            .build()
            .unwrap();
        (orch, log, input)
    }

    #[tokio::test]
    async fn test_confident_prediction_is_accepted() {
        let (orch, log, input) = orchestrator(
            FallbackStrategy::AskThenZeroShot,
            model(POSITIVE, 0.92),
            &[],
            SecondaryClassifier::Unavailable,
        );
        let record = orch.classify("a wonderful film").await.unwrap();

        assert_eq!(
            record,
            DecisionRecord {
                final_label: POSITIVE.into(),
                confidence: 0.92,
                accepted: true,
                reason: "confidence_ok".into(),
            }
        );
        assert_eq!(
            log.event_names(),
            vec!["inference", "confidence_check", "final_decision"]
        );
        assert!(input.prompts().is_empty(), "no fallback should run");
    }

    #[tokio::test]
    async fn test_low_confidence_user_corrects() {
        let (orch, log, _) = orchestrator(
            FallbackStrategy::AskUser,
            model(NEGATIVE, 0.55),
            &["neg"],
            SecondaryClassifier::Unavailable,
        );
        let record = orch.classify("it was fine I guess").await.unwrap();

        assert_eq!(record.final_label, NEGATIVE);
        assert!(!record.accepted);
        assert_eq!(record.reason, "Corrected by user clarification");
        assert_eq!(record.confidence, 0.55);
        assert_eq!(
            log.event_names(),
            vec![
                "inference",
                "confidence_check",
                "fallback_trigger",
                "fallback_result",
                "final_decision"
            ]
        );
    }

    #[tokio::test]
    async fn test_skip_then_zero_shot_on_original_text() {
        let mut zs = MockZeroShotClassifier::new();
        zs.expect_classify()
            .withf(|text, labels| {
                text.to_string() == "it was fine I guess" && labels.as_slice() == ["NEGATIVE", "POSITIVE"]
            })
            .times(1)
            .returning(|_, _| {
                Ok(ZeroShotRanking {
                    labels: vec!["POSITIVE".into(), "NEGATIVE".into()],
                    scores: vec![0.81, 0.19],
                })
            });
        let zs: Arc<dyn ZeroShotClassifier> = Arc::new(zs);
        let (orch, _, _) = orchestrator(
            FallbackStrategy::AskThenZeroShot,
            model(NEGATIVE, 0.55),
            &["skip"],
            SecondaryClassifier::available(zs),
        );
        let record = orch.classify("it was fine I guess").await.unwrap();

        assert_eq!(record.final_label, POSITIVE);
        assert_eq!(record.reason, "Zero-shot fallback: POSITIVE (0.81)");
        assert!(!record.accepted);
    }

    #[tokio::test]
    async fn test_free_text_heuristic_negation() {
        let (orch, _, _) = orchestrator(
            FallbackStrategy::AskUser,
            model(POSITIVE, 0.51),
            &["it wasn't good"],
            SecondaryClassifier::Unavailable,
        );
        let record = orch.classify("so-so").await.unwrap();
        assert_eq!(record.final_label, NEGATIVE);
        assert_eq!(record.reason, "Heuristic from user text");
    }

    #[tokio::test]
    async fn test_exhausted_fallback_defaults_negative() {
        let (orch, log, _) = orchestrator(
            FallbackStrategy::AskThenZeroShot,
            model(POSITIVE, 0.3),
            &["skip", "dunno"],
            SecondaryClassifier::Unavailable,
        );
        let record = orch.classify("???").await.unwrap();
        assert_eq!(record.final_label, NEGATIVE);
        assert_eq!(record.reason, "Default fallback - chose NEGATIVE");

        let records = log.records();
        let last = records.last().unwrap();
        assert_eq!(last.event, "final_decision");
        assert_eq!(last.details["accepted"], false);
        assert_eq!(last.details["reason"], "Default fallback - chose NEGATIVE");
    }

    #[tokio::test]
    async fn test_classify_is_idempotent() {
        let (orch, log, _) = orchestrator(
            FallbackStrategy::AskUser,
            model(NEGATIVE, 0.4),
            &["pos", "pos"],
            SecondaryClassifier::Unavailable,
        );
        let first = orch.classify("same text").await.unwrap();
        let second = orch.classify("same text").await.unwrap();
        assert_eq!(first, second);

        let details: Vec<_> = log.records().into_iter().map(|r| (r.event, r.details)).collect();
        assert_eq!(details.len(), 10);
        assert_eq!(details[..5], details[5..]);
    }

    #[tokio::test]
    async fn test_confidence_check_details() {
        let (orch, log, _) = orchestrator(
            FallbackStrategy::AskUser,
            model(POSITIVE, 0.92),
            &[],
            SecondaryClassifier::Unavailable,
        );
        orch.classify("great").await.unwrap();
        let check = &log.records()[1];
        assert_eq!(check.event, "confidence_check");
        assert_eq!(check.details["threshold"], 0.70);
        assert_eq!(check.details["result"], true);
        assert_eq!(
            check.details["message"],
            "Confidence (92.0%) >= threshold (70%). Accepting prediction."
        );
    }

    #[tokio::test]
    async fn test_boundary_confidence_accepts() {
        let (orch, _, _) = orchestrator(
            FallbackStrategy::AskUser,
            model(NEGATIVE, 0.70),
            &[],
            SecondaryClassifier::Unavailable,
        );
        assert!(orch.classify("edge").await.unwrap().accepted);
    }

    #[tokio::test]
    async fn test_inference_failure_is_propagated_without_logging() {
        let mut mock = MockInferenceModel::new();
        mock.expect_predict()
            .returning(|_| Err(InferenceError::Unavailable("connection refused".into())));
        mock.expect_labels().never();
        let (orch, log, _) = orchestrator(
            FallbackStrategy::AskUser,
            Arc::new(mock),
            &[],
            SecondaryClassifier::Unavailable,
        );
        let err = orch.classify("text").await.unwrap_err();
        assert_eq!(err, InferenceError::Unavailable("connection refused".into()));
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_confidence_is_rejected() {
        let (orch, log, _) = orchestrator(
            FallbackStrategy::AskUser,
            model(POSITIVE, 1.2),
            &[],
            SecondaryClassifier::Unavailable,
        );
        assert_eq!(
            orch.classify("text").await.unwrap_err(),
            InferenceError::InvalidConfidence(1.2)
        );
        assert!(log.is_empty());
    }

    #[test]
    fn test_builder_requires_collaborators() {
        let err = DecisionOrchestrator::builder(DecisionConfig::default())
            .build()
            .err()
            .unwrap();
        assert_eq!(err, ConfigError::MissingCollaborator("inference model"));

        let err = DecisionOrchestrator::builder(DecisionConfig::default())
            .inference(model(POSITIVE, 0.9))
            .input(Arc::new(ScriptedInput::default()))
            .build()
            .err()
            .unwrap();
        assert_eq!(err, ConfigError::MissingCollaborator("decision sink"));
    }

    #[test]
    fn test_builder_rejects_invalid_threshold() {
        let config = DecisionConfig {
            threshold: 2.0,
            strategy: FallbackStrategy::AskUser,
        };
        let err = DecisionOrchestrator::builder(config)
            .inference(model(POSITIVE, 0.9))
            .input(Arc::new(ScriptedInput::default()))
            .sink(Arc::new(MemoryDecisionLog::new()))
            .build()
            .err()
            .unwrap();
        assert_eq!(err, ConfigError::InvalidThreshold(2.0));
    }
}
