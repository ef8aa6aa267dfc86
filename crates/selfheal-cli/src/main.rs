//! `selfheal` command-line entry point.
//!
//! # Usage
//!
//! ```bash
//! # Interactive loop with defaults (threshold 0.70, ask_then_zero_shot)
//! selfheal
//!
//! # Custom endpoints and strategy
//! selfheal run --model-url http://gpu-box:8000/predict --fallback zero_shot \
//!     --zero-shot-url https://api-inference.huggingface.co/models/facebook/bart-large-mnli
//!
//! # Piped input, never prompts
//! cat reviews.txt | selfheal run --non-interactive
//!
//! # Aggregate an audit log
//! selfheal summary --log-file demo_logs.log
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use decision::{DeclineInput, DecisionHistory, InputProvider};
use selfheal_cli::config::{AppConfig, Overrides};
use selfheal_cli::console::ConsoleInput;
use selfheal_cli::{build_orchestrator, inference, repl, telemetry};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Self-healing sentiment classification CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify lines typed on stdin (default)
    Run(RunArgs),
    /// Summarize a decision audit log
    Summary(SummaryArgs),
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// TOML config file (overrides SELFHEAL_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Minimum confidence (0-1) to accept a prediction without fallback
    #[arg(long)]
    threshold: Option<f64>,

    /// Fallback strategy: ask_user, zero_shot or ask_then_zero_shot
    #[arg(long)]
    fallback: Option<String>,

    /// Primary model endpoint (overrides SELFHEAL_INFERENCE_URL)
    #[arg(long)]
    model_url: Option<String>,

    /// Zero-shot endpoint (overrides SELFHEAL_ZERO_SHOT_URL)
    #[arg(long)]
    zero_shot_url: Option<String>,

    /// JSONL decision log (overrides SELFHEAL_LOG_FILE)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Never prompt during fallback; every question gets an empty answer
    #[arg(long, default_value_t = false)]
    non_interactive: bool,
}

impl RunArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            threshold: self.threshold,
            fallback: self.fallback.clone(),
            model_url: self.model_url.clone(),
            zero_shot_url: self.zero_shot_url.clone(),
            log_file: self.log_file.clone(),
        }
    }
}

#[derive(Args, Debug)]
struct SummaryArgs {
    /// TOML config file used to locate the log when --log-file is absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSONL decision log to read
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    telemetry::init("info");

    match Cli::parse().command {
        Some(Command::Run(args)) => run(args).await,
        Some(Command::Summary(args)) => summary(args),
        None => run(RunArgs::default()).await,
    }
}

async fn run(args: RunArgs) -> Result<()> {
    let mut config = AppConfig::load(args.config.as_deref())?;
    config.apply_overrides(&args.overrides());
    info!(
        model = %config.inference.url,
        threshold = config.threshold,
        fallback = %config.fallback,
        log_file = %config.log_file.display(),
        "Self-healing classifier starting"
    );

    if !inference::check_endpoint(&config.inference.url).await {
        warn!(
            url = %config.inference.url,
            "Inference endpoint unreachable; classifications will fail until it is up"
        );
    }

    let console = Arc::new(ConsoleInput::stdio());
    let input: Arc<dyn InputProvider> = if args.non_interactive {
        Arc::new(DeclineInput)
    } else {
        console.clone()
    };
    let orchestrator = build_orchestrator(&config, input)?;

    repl::run(&orchestrator, console.as_ref()).await?;
    Ok(())
}

fn summary(args: SummaryArgs) -> Result<()> {
    let path = match args.log_file {
        Some(path) => path,
        None => AppConfig::load(args.config.as_deref())?.log_file,
    };
    let history = DecisionHistory::read_from_file(&path)
        .context(format!("Failed to summarize {}", path.display()))?;
    print!("{}", history.stats().render());
    Ok(())
}
