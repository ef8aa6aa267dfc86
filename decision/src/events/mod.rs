//! Decision audit log.
//!
//! Each classification episode is recorded as an ordered sequence of phase
//! events appended to a [`DecisionSink`]. Every record carries a UTC
//! timestamp, the event name and a JSON details payload:
//!
//! ```text
//! {"timestamp":"2025-01-01T12:00:00.123Z","event":"confidence_check","details":{...}}
//! ```
//!
//! 1. **Types** (`types.rs`): the five phase events and the on-disk record.
//! 2. **Sinks** (`sink.rs`): JSONL file and in-memory sinks.
//! 3. **History** (`history.rs`): read a log back and aggregate it.

pub mod history;
pub mod sink;
pub mod types;

pub use history::{DecisionHistory, DecisionStats};
pub use sink::{DecisionSink, JsonlDecisionLog, MemoryDecisionLog};
pub use types::{DecisionEvent, LogRecord};
