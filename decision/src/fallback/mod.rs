//! Fallback escalation chain.
//!
//! Once the confidence gate rejects a prediction, the resolver walks the
//! stages enabled by the configured [`FallbackStrategy`] and finishes with a
//! forced explicit choice. It never returns without a label.

pub mod heuristics;
pub mod resolver;
pub mod strategy;

pub use heuristics::has_negation_marker;
pub use resolver::{FallbackOutcome, FallbackResolver};
pub use strategy::{FallbackStage, FallbackStrategy};
