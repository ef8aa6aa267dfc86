//! HTTP-backed zero-shot classifier.
//!
//! Speaks the Hugging Face inference API shape for zero-shot
//! classification: the request carries the text and the candidate labels,
//! the response ranks every label best first.

use std::time::Duration;

use async_trait::async_trait;
use decision::{CandidateLabels, ZeroShotClassifier, ZeroShotError, ZeroShotRanking};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ZeroShotSettings;

#[derive(Debug, Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Debug, Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ZeroShotResponse {
    labels: Vec<String>,
    scores: Vec<f64>,
}

pub struct HttpZeroShotClassifier {
    client: reqwest::Client,
    url: String,
    api_token: Option<String>,
}

impl HttpZeroShotClassifier {
    pub fn new(settings: &ZeroShotSettings) -> Result<Self, ZeroShotError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ZeroShotError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            url: settings.url.clone(),
            api_token: settings.api_token.clone().filter(|t| !t.is_empty()),
        })
    }
}

#[async_trait]
impl ZeroShotClassifier for HttpZeroShotClassifier {
    async fn classify(
        &self,
        text: &str,
        candidate_labels: &CandidateLabels,
    ) -> Result<ZeroShotRanking, ZeroShotError> {
        let request = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters {
                candidate_labels: candidate_labels.as_slice(),
            },
        };
        let mut builder = self.client.post(&self.url).json(&request);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ZeroShotError::Unavailable(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ZeroShotError::Unavailable(format!(
                "zero-shot endpoint error ({status}): {body}"
            )));
        }

        let body: ZeroShotResponse = response
            .json()
            .await
            .map_err(|e| ZeroShotError::Unavailable(format!("unreadable response: {e}")))?;
        if body.labels.is_empty() {
            return Err(ZeroShotError::EmptyRanking);
        }
        if body.labels.len() != body.scores.len() {
            return Err(ZeroShotError::MismatchedRanking {
                labels: body.labels.len(),
                scores: body.scores.len(),
            });
        }
        debug!(labels = ?body.labels, scores = ?body.scores, "Zero-shot ranking");

        Ok(ZeroShotRanking {
            labels: body.labels,
            scores: body.scores,
        })
    }
}
