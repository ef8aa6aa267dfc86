//! HTTP-backed primary classifier.
//!
//! The endpoint receives `{"inputs": "<text>"}` and answers with the raw
//! classification logits, either flat (`{"logits": [-1.2, 2.3]}`) or as a
//! single-item batch (`{"logits": [[-1.2, 2.3]]}`). Softmax and argmax are
//! applied here and the winning class index is mapped through the
//! configured label vocabulary.

use std::time::Duration;

use async_trait::async_trait;
use decision::{InferenceError, InferenceModel, Prediction};
use serde::Deserialize;
use tracing::debug;

use crate::config::InferenceSettings;

#[derive(Debug, Deserialize)]
struct LogitsResponse {
    logits: Logits,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Logits {
    Flat(Vec<f64>),
    Batched(Vec<Vec<f64>>),
}

impl Logits {
    fn into_row(self) -> Result<Vec<f64>, InferenceError> {
        match self {
            Logits::Flat(row) => Ok(row),
            Logits::Batched(mut rows) if rows.len() == 1 => Ok(rows.remove(0)),
            Logits::Batched(rows) => Err(InferenceError::MalformedResponse(format!(
                "expected a single row of logits, got {}",
                rows.len()
            ))),
        }
    }
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Map a logit row onto the label vocabulary.
///
/// Ties resolve to the lowest class index.
pub fn prediction_from_logits(
    logits: &[f64],
    labels: &[String],
) -> Result<Prediction, InferenceError> {
    if labels.is_empty() {
        return Err(InferenceError::EmptyVocabulary);
    }
    if logits.len() != labels.len() {
        return Err(InferenceError::MalformedResponse(format!(
            "got {} logits for {} labels",
            logits.len(),
            labels.len()
        )));
    }
    if logits.iter().any(|l| !l.is_finite()) {
        return Err(InferenceError::MalformedResponse(
            "logits contain non-finite values".into(),
        ));
    }

    let probs = softmax(logits);
    let (index, confidence) = probs
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, p)| {
            if p > best.1 {
                (i, p)
            } else {
                best
            }
        });
    Ok(Prediction::new(labels[index].clone(), confidence))
}

/// Sequence classifier served over HTTP.
pub struct HttpInferenceModel {
    client: reqwest::Client,
    url: String,
    labels: Vec<String>,
}

impl HttpInferenceModel {
    pub fn new(settings: &InferenceSettings) -> Result<Self, InferenceError> {
        if settings.labels.is_empty() {
            return Err(InferenceError::EmptyVocabulary);
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| InferenceError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            url: settings.url.clone(),
            labels: settings.labels.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl InferenceModel for HttpInferenceModel {
    async fn predict(&self, text: &str) -> Result<Prediction, InferenceError> {
        let response = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "inputs": text }))
            .send()
            .await
            .map_err(|e| InferenceError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Unavailable(format!(
                "inference endpoint error ({status}): {body}"
            )));
        }

        let body: LogitsResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::MalformedResponse(e.to_string()))?;
        let logits = body.logits.into_row()?;
        debug!(?logits, "Received logits");

        prediction_from_logits(&logits, &self.labels)
    }

    fn labels(&self) -> Vec<String> {
        self.labels.clone()
    }
}

/// Check whether an HTTP endpoint answers at all.
///
/// Any HTTP response counts as reachable; only transport failures do not.
pub async fn check_endpoint(url: &str) -> bool {
    reqwest::Client::new()
        .get(url)
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .is_ok()
}
