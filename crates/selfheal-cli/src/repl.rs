//! Interactive classification loop.

use std::io::Write;

use anyhow::Result;
use decision::{DecisionOrchestrator, DecisionRecord};
use tokio::io::AsyncBufRead;
use tracing::{error, info};

use crate::console::ConsoleInput;

pub const BANNER: &str = "=== Self-Healing Classification CLI ===";
pub const INPUT_PROMPT: &str = "\nInput: ";

/// Counts for one REPL session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub decisions: usize,
    pub failures: usize,
}

/// One-line rendering of a decision for the terminal.
pub fn render_result(record: &DecisionRecord) -> String {
    format!(
        "[CLI] Result -> Label: {}, Confidence of model: {:.1}%, Accepted: {}, Reason: {}",
        record.final_label,
        record.confidence * 100.0,
        record.accepted,
        record.reason
    )
}

fn is_exit_command(text: &str) -> bool {
    text.eq_ignore_ascii_case("exit") || text.eq_ignore_ascii_case("quit")
}

/// Read lines from `console` and classify each until `exit`, `quit` or EOF.
///
/// A failing inference endpoint is reported and the loop continues.
pub async fn run<R, W>(
    orchestrator: &DecisionOrchestrator,
    console: &ConsoleInput<R, W>,
) -> Result<SessionSummary>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    let mut summary = SessionSummary::default();
    console.say(BANNER)?;
    console.say("Type a sentence to classify (type 'exit' to quit).")?;

    while let Some(line) = console.read_line(INPUT_PROMPT).await? {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if is_exit_command(text) {
            console.say("Exiting CLI.")?;
            break;
        }

        match orchestrator.classify(text).await {
            Ok(record) => {
                summary.decisions += 1;
                console.say(&render_result(&record))?;
            }
            Err(e) => {
                summary.failures += 1;
                error!(error = %e, "Classification failed");
                console.say(&format!("[CLI] Error: {e}"))?;
            }
        }
    }

    info!(
        decisions = summary.decisions,
        failures = summary.failures,
        "Session finished"
    );
    Ok(summary)
}
