// Scoring service abstraction
//
// This module defines the boundary between the cleaning core and the two
// opaque ML scoring services it consumes: a per-token noise classifier and a
// sentence embedder. The core never depends on model internals, only on
// these contracts, so any compatible backend (HTTP model server, in-process
// model, test stub) can be plugged in.

use thiserror::Error;

#[cfg(feature = "http-backend")]
pub mod http;

#[cfg(feature = "http-backend")]
pub use http::{HttpEmbedder, HttpTokenClassifier};

#[derive(Debug, Error)]
pub enum ScoringError {
    /// Service was never provided, or has been released
    #[error("scoring service unavailable")]
    ServiceUnavailable,
    /// The backend call itself failed (network, malformed response, ...)
    #[error("scoring call failed: {0}")]
    CallFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLabel {
    Noise,
    Clean,
}

/// One classified sub-token range, in the same byte coordinate space
/// as the input string.
#[derive(Debug, Clone)]
pub struct TokenRange {
    pub start: usize,
    pub end: usize,
    pub label: TokenLabel,
}

/// Per-token noise classifier. The core treats `Noise` as the only
/// meaningful label; everything else is kept.
pub trait TokenClassifier {
    fn score_tokens(&self, text: &str) -> Result<Vec<TokenRange>, ScoringError>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Sentence embedding service. Returns a fixed-dimension vector;
/// vectors are compared by cosine similarity.
pub trait SentenceEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ScoringError>;

    fn name(&self) -> &str;
}

/// Cosine similarity between two vectors.
/// Mismatched lengths or zero-norm inputs score 0.0 rather than erroring;
/// a degenerate embedding should read as "no similarity", not abort a run.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Process-scoped scoring context. Both services are loaded once at pipeline
/// start and explicitly released at pipeline end; the core must not score
/// after teardown (calls after `release()` return `ServiceUnavailable` and
/// take the documented degradation paths).
pub struct ScoringServices {
    classifier: Option<Box<dyn TokenClassifier>>,
    embedder: Option<Box<dyn SentenceEmbedder>>,
}

impl ScoringServices {
    pub fn new(
        classifier: Option<Box<dyn TokenClassifier>>,
        embedder: Option<Box<dyn SentenceEmbedder>>,
    ) -> Self {
        Self {
            classifier,
            embedder,
        }
    }

    /// A context with neither service attached. Every scoring call degrades.
    pub fn degraded() -> Self {
        Self {
            classifier: None,
            embedder: None,
        }
    }

    pub fn score_tokens(&self, text: &str) -> Result<Vec<TokenRange>, ScoringError> {
        match &self.classifier {
            Some(c) => c.score_tokens(text),
            None => Err(ScoringError::ServiceUnavailable),
        }
    }

    pub fn embed(&self, text: &str) -> Result<Vec<f32>, ScoringError> {
        match &self.embedder {
            Some(e) => e.embed(text),
            None => Err(ScoringError::ServiceUnavailable),
        }
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn has_embedder(&self) -> bool {
        self.embedder.is_some()
    }

    /// Idempotent teardown. Drops both services; safe to call twice.
    pub fn release(&mut self) {
        if self.classifier.is_some() || self.embedder.is_some() {
            println!("🧹 Releasing scoring services...");
            self.classifier = None;
            self.embedder = None;
            println!("✅ Scoring services released.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEmbedder(Vec<f32>);

    impl SentenceEmbedder for FixedEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, ScoringError> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = vec![0.5, -1.0, 2.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn cosine_handles_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn release_is_idempotent_and_degrades_scoring() {
        let mut services =
            ScoringServices::new(None, Some(Box::new(FixedEmbedder(vec![1.0, 0.0]))));
        assert!(services.has_embedder());
        assert!(services.embed("hello").is_ok());

        services.release();
        services.release(); // second call must be safe

        assert!(!services.has_embedder());
        assert!(matches!(
            services.embed("hello"),
            Err(ScoringError::ServiceUnavailable)
        ));
        assert!(matches!(
            services.score_tokens("hello"),
            Err(ScoringError::ServiceUnavailable)
        ));
    }
}
