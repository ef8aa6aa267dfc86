//! Runtime configuration.
//!
//! Layered lowest to highest: built-in defaults, optional TOML file,
//! `SELFHEAL_*` environment variables, command-line flags.
//!
//! ```toml
//! threshold = 0.70
//! fallback = "ask_then_zero_shot"
//! log_file = "demo_logs.log"
//!
//! [inference]
//! url = "http://127.0.0.1:8000/predict"
//! labels = ["NEGATIVE", "POSITIVE"]
//! timeout_secs = 30
//!
//! [zero_shot]
//! url = "https://api-inference.huggingface.co/models/facebook/bart-large-mnli"
//! api_token = "hf_..."
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use decision::{
    ConfigError, DecisionConfig, FallbackStrategy, DEFAULT_THRESHOLD, NEGATIVE, POSITIVE,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_LOG_FILE: &str = "demo_logs.log";
pub const DEFAULT_INFERENCE_URL: &str = "http://127.0.0.1:8000/predict";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Primary model endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceSettings {
    pub url: String,
    /// Class labels ordered by logit index
    pub labels: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_INFERENCE_URL.into(),
            labels: vec![NEGATIVE.into(), POSITIVE.into()],
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Zero-shot endpoint. Absent unless configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroShotSettings {
    pub url: String,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub threshold: f64,
    /// Strategy name, validated when the decision config is built
    pub fallback: String,
    pub log_file: PathBuf,
    pub inference: InferenceSettings,
    pub zero_shot: Option<ZeroShotSettings>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            fallback: FallbackStrategy::default().to_string(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            inference: InferenceSettings::default(),
            zero_shot: None,
        }
    }
}

/// Values supplied on the command line; `None` leaves the lower layer alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub threshold: Option<f64>,
    pub fallback: Option<String>,
    pub model_url: Option<String>,
    pub zero_shot_url: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load defaults, then the config file (explicit path or `SELFHEAL_CONFIG`),
    /// then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("SELFHEAL_CONFIG").ok().map(PathBuf::from));
        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
        Self::from_toml(&content).context(format!("Failed to parse {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `SELFHEAL_*` variables through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("SELFHEAL_THRESHOLD") {
            self.threshold = raw
                .trim()
                .parse()
                .context(format!("SELFHEAL_THRESHOLD is not a number: {raw}"))?;
        }
        if let Some(fallback) = lookup("SELFHEAL_FALLBACK") {
            self.fallback = fallback;
        }
        if let Some(log_file) = lookup("SELFHEAL_LOG_FILE") {
            self.log_file = PathBuf::from(log_file);
        }
        if let Some(url) = lookup("SELFHEAL_INFERENCE_URL") {
            self.inference.url = url;
        }
        if let Some(url) = lookup("SELFHEAL_ZERO_SHOT_URL") {
            self.zero_shot_mut().url = url;
        }
        // Stored before any URL is known; zero_shot_for skips entries without one
        if let Some(token) = lookup("SELFHEAL_ZERO_SHOT_TOKEN") {
            self.zero_shot_mut().api_token = Some(token);
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(threshold) = overrides.threshold {
            self.threshold = threshold;
        }
        if let Some(fallback) = &overrides.fallback {
            self.fallback = fallback.clone();
        }
        if let Some(url) = &overrides.model_url {
            self.inference.url = url.clone();
        }
        if let Some(url) = &overrides.zero_shot_url {
            self.zero_shot_mut().url = url.clone();
        }
        if let Some(log_file) = &overrides.log_file {
            self.log_file = log_file.clone();
        }
    }

    /// Validated threshold and strategy for the orchestrator.
    pub fn decision_config(&self) -> Result<DecisionConfig, ConfigError> {
        DecisionConfig::parse(self.threshold, &self.fallback)
    }

    /// Zero-shot settings to wire, if the strategy consults a secondary
    /// classifier and an endpoint is configured.
    pub fn zero_shot_for(&self, strategy: FallbackStrategy) -> Option<&ZeroShotSettings> {
        if !strategy.uses_zero_shot() {
            return None;
        }
        self.zero_shot.as_ref().filter(|z| !z.url.trim().is_empty())
    }

    fn zero_shot_mut(&mut self) -> &mut ZeroShotSettings {
        self.zero_shot.get_or_insert_with(|| ZeroShotSettings {
            url: String::new(),
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.threshold, 0.70);
        assert_eq!(config.fallback, "ask_then_zero_shot");
        assert_eq!(config.log_file, PathBuf::from("demo_logs.log"));
        assert_eq!(config.inference.labels, vec!["NEGATIVE", "POSITIVE"]);
        assert!(config.zero_shot.is_none());
        assert_eq!(config.decision_config().unwrap(), DecisionConfig::default());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            threshold = 0.8

            [zero_shot]
            url = "http://zs.local/classify"
            "#,
        )
        .unwrap();
        assert_eq!(config.threshold, 0.8);
        assert_eq!(config.fallback, "ask_then_zero_shot");
        assert_eq!(config.inference.url, DEFAULT_INFERENCE_URL);
        let zero_shot = config.zero_shot.unwrap();
        assert_eq!(zero_shot.url, "http://zs.local/classify");
        assert_eq!(zero_shot.timeout_secs, 30);
        assert!(zero_shot.api_token.is_none());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selfheal.toml");
        std::fs::write(
            &path,
            "fallback = \"zero_shot\"\n[inference]\nlabels = [\"NEG\", \"NEU\", \"POS\"]\n",
        )
        .unwrap();
        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.fallback, "zero_shot");
        assert_eq!(config.inference.labels.len(), 3);
        assert_eq!(config.inference.timeout_secs, 30);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::from_file(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = AppConfig::from_toml("threshold = 0.8").unwrap();
        config
            .apply_env(env(&[
                ("SELFHEAL_THRESHOLD", "0.9"),
                ("SELFHEAL_FALLBACK", "ask_user"),
                ("SELFHEAL_LOG_FILE", "/tmp/decisions.log"),
                ("SELFHEAL_INFERENCE_URL", "http://model.local/predict"),
                ("SELFHEAL_ZERO_SHOT_URL", "http://zs.local"),
                ("SELFHEAL_ZERO_SHOT_TOKEN", "secret"),
            ]))
            .unwrap();
        assert_eq!(config.threshold, 0.9);
        assert_eq!(config.fallback, "ask_user");
        assert_eq!(config.log_file, PathBuf::from("/tmp/decisions.log"));
        assert_eq!(config.inference.url, "http://model.local/predict");
        let zero_shot = config.zero_shot.unwrap();
        assert_eq!(zero_shot.url, "http://zs.local");
        assert_eq!(zero_shot.api_token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_env_rejects_bad_threshold() {
        let mut config = AppConfig::default();
        assert!(config
            .apply_env(env(&[("SELFHEAL_THRESHOLD", "high")]))
            .is_err());
    }

    #[test]
    fn test_token_without_url_wires_nothing() {
        let mut config = AppConfig::default();
        config
            .apply_env(env(&[("SELFHEAL_ZERO_SHOT_TOKEN", "secret")]))
            .unwrap();
        assert!(config.zero_shot_for(FallbackStrategy::ZeroShot).is_none());
    }

    #[test]
    fn test_env_token_survives_url_flag() {
        let mut config = AppConfig::default();
        config
            .apply_env(env(&[("SELFHEAL_ZERO_SHOT_TOKEN", "secret")]))
            .unwrap();
        config.apply_overrides(&Overrides {
            zero_shot_url: Some("http://zs.local/classify".into()),
            ..Overrides::default()
        });

        let zero_shot = config.zero_shot_for(FallbackStrategy::ZeroShot).unwrap();
        assert_eq!(zero_shot.url, "http://zs.local/classify");
        assert_eq!(zero_shot.api_token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_overrides_win() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[("SELFHEAL_THRESHOLD", "0.9")])).unwrap();
        config.apply_overrides(&Overrides {
            threshold: Some(0.5),
            fallback: Some("zero_shot".into()),
            zero_shot_url: Some("http://zs.local".into()),
            ..Overrides::default()
        });
        assert_eq!(config.threshold, 0.5);
        let decision = config.decision_config().unwrap();
        assert_eq!(decision.strategy, FallbackStrategy::ZeroShot);
        assert!(config.zero_shot_for(decision.strategy).is_some());
    }

    #[test]
    fn test_invalid_values_surface_as_config_errors() {
        let mut config = AppConfig::default();
        config.apply_overrides(&Overrides {
            threshold: Some(1.2),
            ..Overrides::default()
        });
        assert_eq!(
            config.decision_config(),
            Err(ConfigError::InvalidThreshold(1.2))
        );

        let mut config = AppConfig::default();
        config.fallback = "guess".into();
        assert_eq!(
            config.decision_config(),
            Err(ConfigError::UnknownStrategy("guess".into()))
        );
    }

    #[test]
    fn test_zero_shot_only_wired_for_zero_shot_strategies() {
        let config = AppConfig::from_toml("[zero_shot]\nurl = \"http://zs.local\"").unwrap();
        assert!(config.zero_shot_for(FallbackStrategy::AskUser).is_none());
        assert!(config.zero_shot_for(FallbackStrategy::ZeroShot).is_some());
        assert!(config
            .zero_shot_for(FallbackStrategy::AskThenZeroShot)
            .is_some());
        assert!(AppConfig::default()
            .zero_shot_for(FallbackStrategy::ZeroShot)
            .is_none());
    }
}
