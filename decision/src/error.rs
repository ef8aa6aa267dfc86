//! Error types for the decision core.
//!
//! The escalation logic itself never fails. Errors only surface at the
//! edges: invalid configuration at construction time, and collaborators
//! that are unreachable or break their contract.

use thiserror::Error;

/// Configuration rejected when building an orchestrator. Always fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Threshold is NaN, infinite, or outside `[0, 1]`
    #[error("threshold must be a finite value in [0, 1], got {0}")]
    InvalidThreshold(f64),

    /// Strategy string is not one of the known fallback strategies
    #[error("unknown fallback strategy '{0}' (expected ask_user, zero_shot or ask_then_zero_shot)")]
    UnknownStrategy(String),

    /// Builder finished without a required collaborator
    #[error("missing required collaborator: {0}")]
    MissingCollaborator(&'static str),
}

/// Failure of the primary inference collaborator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    /// Model endpoint could not be reached or returned an error status
    #[error("inference model unavailable: {0}")]
    Unavailable(String),

    /// Model returned a confidence outside `[0, 1]`
    #[error("inference model returned confidence {0} outside [0, 1]")]
    InvalidConfidence(f64),

    /// Model has no label vocabulary to map predictions onto
    #[error("inference model has an empty label vocabulary")]
    EmptyVocabulary,

    /// Model response could not be interpreted
    #[error("malformed inference response: {0}")]
    MalformedResponse(String),
}

/// Failure of the optional secondary (zero-shot) classifier.
///
/// Never escapes the resolver: any of these makes the stage fall through.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ZeroShotError {
    #[error("zero-shot classifier unavailable: {0}")]
    Unavailable(String),

    #[error("zero-shot classifier returned no labels")]
    EmptyRanking,

    /// Ranking with a different number of labels and scores
    #[error("zero-shot classifier returned {labels} labels but {scores} scores")]
    MismatchedRanking { labels: usize, scores: usize },
}

/// Errors reading a decision log back from disk.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to read decision log: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed decision log record at line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for history operations
pub type HistoryResult<T> = Result<T, HistoryError>;
