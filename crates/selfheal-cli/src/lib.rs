//! Runtime glue for the self-healing classifier.
//!
//! Wires HTTP model endpoints, the console and the JSONL audit log into a
//! [`decision::DecisionOrchestrator`] and drives it from an interactive
//! loop.

pub mod config;
pub mod console;
pub mod inference;
pub mod repl;
pub mod telemetry;
pub mod zero_shot;

use std::sync::Arc;

use anyhow::{Context, Result};
use decision::{DecisionOrchestrator, InputProvider, JsonlDecisionLog, SecondaryClassifier};
use tracing::info;

use crate::config::AppConfig;
use crate::inference::HttpInferenceModel;
use crate::zero_shot::HttpZeroShotClassifier;

/// Build an orchestrator from resolved configuration.
///
/// The zero-shot endpoint is only wired when the strategy consults it.
pub fn build_orchestrator(
    config: &AppConfig,
    input: Arc<dyn InputProvider>,
) -> Result<DecisionOrchestrator> {
    let decision_config = config.decision_config()?;
    let model = HttpInferenceModel::new(&config.inference)?;

    let secondary = match config.zero_shot_for(decision_config.strategy) {
        Some(settings) => {
            info!(url = %settings.url, "Zero-shot fallback enabled");
            SecondaryClassifier::available(Arc::new(HttpZeroShotClassifier::new(settings)?))
        }
        None => SecondaryClassifier::Unavailable,
    };

    let sink = JsonlDecisionLog::open(&config.log_file).context(format!(
        "Failed to open decision log {}",
        config.log_file.display()
    ))?;

    Ok(DecisionOrchestrator::builder(decision_config)
        .inference(Arc::new(model))
        .input(input)
        .secondary(secondary)
        .sink(Arc::new(sink))
        .build()?)
}
