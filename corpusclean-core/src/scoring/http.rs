// HTTP scoring backend
//
// Drives both scoring services through a blocking HTTP boundary to an
// external model server (the models themselves are opaque to the core).
// One request per call, fully synchronous: the pipeline issues a call,
// waits for the complete result, and proceeds.

use super::{ScoringError, SentenceEmbedder, TokenClassifier, TokenLabel, TokenRange};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    ranges: Vec<WireRange>,
}

#[derive(Debug, Deserialize)]
struct WireRange {
    start: usize,
    end: usize,
    label: String,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

pub struct HttpTokenClassifier {
    endpoint: String,
    agent: ureq::Agent,
}

impl HttpTokenClassifier {
    pub fn new(base_url: &str) -> Self {
        Self {
            endpoint: format!("{}/classify", base_url.trim_end_matches('/')),
            agent: ureq::Agent::new(),
        }
    }
}

impl TokenClassifier for HttpTokenClassifier {
    fn score_tokens(&self, text: &str) -> Result<Vec<TokenRange>, ScoringError> {
        let response = self
            .agent
            .post(&self.endpoint)
            .send_json(serde_json::json!({ "text": text }))
            .map_err(|e| ScoringError::CallFailed(e.to_string()))?;

        let parsed: ClassifyResponse = response
            .into_json()
            .map_err(|e| ScoringError::CallFailed(format!("invalid classify response: {e}")))?;

        Ok(parsed
            .ranges
            .into_iter()
            .map(|r| TokenRange {
                start: r.start,
                end: r.end,
                label: if r.label == "noise" {
                    TokenLabel::Noise
                } else {
                    TokenLabel::Clean
                },
            })
            .collect())
    }

    fn name(&self) -> &str {
        "http-token-classifier"
    }
}

pub struct HttpEmbedder {
    endpoint: String,
    agent: ureq::Agent,
}

impl HttpEmbedder {
    pub fn new(base_url: &str) -> Self {
        Self {
            endpoint: format!("{}/embed", base_url.trim_end_matches('/')),
            agent: ureq::Agent::new(),
        }
    }
}

impl SentenceEmbedder for HttpEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ScoringError> {
        let response = self
            .agent
            .post(&self.endpoint)
            .send_json(serde_json::json!({ "text": text }))
            .map_err(|e| ScoringError::CallFailed(e.to_string()))?;

        let parsed: EmbedResponse = response
            .into_json()
            .map_err(|e| ScoringError::CallFailed(format!("invalid embed response: {e}")))?;

        Ok(parsed.embedding)
    }

    fn name(&self) -> &str {
        "http-embedder"
    }
}
