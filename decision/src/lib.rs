//! Self-healing decision core.
//!
//! Classifies one input, checks whether the model's confidence is
//! trustworthy, and repairs untrustworthy decisions through a fallback
//! escalation chain that always terminates with a label and a reason.
//!
//! # Components
//!
//! - [`gate`]: Confidence Gate, a pure accept/escalate function.
//! - [`fallback`]: Fallback Resolver, the user clarification → secondary
//!   classifier → forced choice chain.
//! - [`orchestrator`]: Decision Orchestrator, the only entry point callers
//!   need ([`DecisionOrchestrator::classify`]).
//!
//! Models, terminals and log storage are injected through the traits in
//! [`collaborators`] and [`events`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use decision::{DecisionConfig, DecisionOrchestrator, FallbackStrategy, JsonlDecisionLog};
//!
//! let orchestrator = DecisionOrchestrator::builder(DecisionConfig::new(0.70, FallbackStrategy::AskUser)?)
//!     .inference(model)
//!     .input(console)
//!     .sink(Arc::new(JsonlDecisionLog::open("decisions.log")?))
//!     .build()?;
//!
//! let record = orchestrator.classify("the plot was thin").await?;
//! println!("{} ({})", record.final_label, record.reason);
//! ```

pub mod collaborators;
pub mod config;
pub mod error;
pub mod events;
pub mod fallback;
pub mod gate;
pub mod labels;
pub mod orchestrator;

pub use collaborators::{
    DeclineInput, InferenceModel, InputProvider, Prediction, ScriptedInput, SecondaryClassifier,
    ZeroShotClassifier, ZeroShotRanking,
};
pub use config::{DecisionConfig, DEFAULT_THRESHOLD};
pub use error::{ConfigError, HistoryError, InferenceError, ZeroShotError};
pub use events::{
    DecisionEvent, DecisionHistory, DecisionSink, DecisionStats, JsonlDecisionLog, LogRecord,
    MemoryDecisionLog,
};
pub use fallback::{FallbackOutcome, FallbackResolver, FallbackStage, FallbackStrategy};
pub use gate::{evaluate, ConfidenceVerdict};
pub use labels::{CandidateLabels, NEGATIVE, POSITIVE};
pub use orchestrator::{DecisionOrchestrator, DecisionRecord, OrchestratorBuilder};
