//! Lexical heuristic used when free-text clarification cannot be handed to
//! a secondary classifier.
//!
//! The heuristic is biased toward POSITIVE on purpose: anything without a
//! negation marker is read as positive.

use regex::Regex;
use std::sync::LazyLock;

use crate::labels::{NEGATIVE, POSITIVE};

/// Reason attached when a negation marker was found
pub const NEGATION_REASON: &str = "Heuristic from user text";
/// Reason attached when the positive default applied
pub const DEFAULT_POSITIVE_REASON: &str = "Heuristic from user text (default positive)";

/// Standalone "no" as a word.
static NO_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bno\b").unwrap());

/// Whether `text` carries a negation marker: the substring "not", the
/// contraction suffix "n't", or the standalone word "no".
pub fn has_negation_marker(text: &str) -> bool {
    let lowered = text.to_lowercase().replace('\u{2019}', "'");
    lowered.contains("not") || lowered.contains("n't") || NO_WORD.is_match(&lowered)
}

/// Interpret free text as a label with a reason.
pub fn interpret(text: &str) -> (&'static str, &'static str) {
    if has_negation_marker(text) {
        (NEGATIVE, NEGATION_REASON)
    } else {
        (POSITIVE, DEFAULT_POSITIVE_REASON)
    }
}
