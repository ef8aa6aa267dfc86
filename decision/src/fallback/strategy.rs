//! Fallback strategy selection.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ConfigError;

/// Which escalation stages are eligible once the confidence gate rejects.
///
/// The forced explicit choice is not selectable: it always runs last when
/// every eligible stage has fallen through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackStrategy {
    /// Ask the user for clarification only
    AskUser,
    /// Consult the secondary classifier only
    ZeroShot,
    /// Ask the user first, then consult the secondary classifier
    #[default]
    AskThenZeroShot,
}

/// A single stage in the escalation chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackStage {
    /// Prompt the user for a label or free text
    UserClarification,
    /// Classify the original text with the secondary classifier
    SecondaryClassifier,
    /// Prompt the user for the final label, defaulting when unrecognised
    ForcedChoice,
}

impl FallbackStrategy {
    /// Every strategy, in declaration order.
    pub const ALL: [FallbackStrategy; 3] = [Self::AskUser, Self::ZeroShot, Self::AskThenZeroShot];

    /// Optional stages to attempt, in order, before the forced choice.
    pub fn stages(self) -> &'static [FallbackStage] {
        match self {
            Self::AskUser => &[FallbackStage::UserClarification],
            Self::ZeroShot => &[FallbackStage::SecondaryClassifier],
            Self::AskThenZeroShot => &[
                FallbackStage::UserClarification,
                FallbackStage::SecondaryClassifier,
            ],
        }
    }

    /// Whether this strategy asks the user before anything else.
    pub fn asks_user(self) -> bool {
        match self {
            Self::AskUser | Self::AskThenZeroShot => true,
            Self::ZeroShot => false,
        }
    }

    /// Whether this strategy includes the secondary classifier stage.
    pub fn uses_zero_shot(self) -> bool {
        match self {
            Self::ZeroShot | Self::AskThenZeroShot => true,
            Self::AskUser => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AskUser => "ask_user",
            Self::ZeroShot => "zero_shot",
            Self::AskThenZeroShot => "ask_then_zero_shot",
        }
    }
}

impl std::fmt::Display for FallbackStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FallbackStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == normalized)
            .ok_or_else(|| ConfigError::UnknownStrategy(s.to_string()))
    }
}

impl std::fmt::Display for FallbackStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserClarification => write!(f, "user_clarification"),
            Self::SecondaryClassifier => write!(f, "secondary_classifier"),
            Self::ForcedChoice => write!(f, "forced_choice"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forced_choice_is_never_an_optional_stage() {
        for strategy in FallbackStrategy::ALL {
            assert!(
                !strategy.stages().contains(&FallbackStage::ForcedChoice),
                "{strategy}"
            );
            assert_eq!(
                strategy.stages().contains(&FallbackStage::UserClarification),
                strategy.asks_user()
            );
            assert_eq!(
                strategy.stages().contains(&FallbackStage::SecondaryClassifier),
                strategy.uses_zero_shot()
            );
        }
    }

    #[test]
    fn test_ask_then_zero_shot_order() {
        assert_eq!(
            FallbackStrategy::AskThenZeroShot.stages(),
            &[
                FallbackStage::UserClarification,
                FallbackStage::SecondaryClassifier
            ]
        );
    }

    #[test]
    fn test_parse_known_strategies() {
        assert_eq!(
            "ask_user".parse::<FallbackStrategy>(),
            Ok(FallbackStrategy::AskUser)
        );
        assert_eq!(
            "Zero-Shot".parse::<FallbackStrategy>(),
            Ok(FallbackStrategy::ZeroShot)
        );
        assert_eq!(
            " ask_then_zero_shot ".parse::<FallbackStrategy>(),
            Ok(FallbackStrategy::AskThenZeroShot)
        );
    }

    #[test]
    fn test_parse_unknown_strategy_is_error() {
        let err = "ask_everyone".parse::<FallbackStrategy>().unwrap_err();
        assert_eq!(err, ConfigError::UnknownStrategy("ask_everyone".to_string()));
    }

    #[test]
    fn test_serde_names_match_display() {
        for strategy in FallbackStrategy::ALL {
            let json = serde_json::to_string(&strategy).unwrap();
            assert_eq!(json, format!("\"{strategy}\""));
        }
    }
}
