// SemanticGate - stage 2 of the relevance chain (embedding similarity)
//
// Two concept centroids (positive = on-topic, negative = known noise
// domains) are embedded once per run; each document snippet is compared
// against both. Failure to embed fails CLOSED: an unavailable service
// must never wave documents through.

use crate::config::ConceptConfig;
use crate::scoring::{cosine_similarity, ScoringServices};
use crate::types::GateDecision;

pub struct SemanticGate {
    concepts: ConceptConfig,
    threshold: f32,
    snippet_len: usize,
    positive_embedding: Option<Vec<f32>>,
    negative_embedding: Option<Vec<f32>>,
}

impl SemanticGate {
    pub fn new(
        concepts: ConceptConfig,
        threshold: f32,
        snippet_len: usize,
        services: &ScoringServices,
    ) -> Self {
        let mut gate = Self {
            concepts,
            threshold,
            snippet_len,
            positive_embedding: None,
            negative_embedding: None,
        };
        gate.update_embeddings(services);
        gate
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
    }

    /// Recompute both concept centroids. Called on construction and again
    /// whenever the concept lists change. A failed embed leaves the
    /// centroid unset and every subsequent evaluation fails closed.
    pub fn update_embeddings(&mut self, services: &ScoringServices) {
        self.positive_embedding = embed_joined(services, &self.concepts.positive);
        self.negative_embedding = embed_joined(services, &self.concepts.negative);
    }

    pub fn evaluate(&self, services: &ScoringServices, text: &str, title: &str) -> GateDecision {
        let (pos_ref, neg_ref) = match (&self.positive_embedding, &self.negative_embedding) {
            (Some(p), Some(n)) => (p, n),
            _ => return GateDecision::fail("SERVICE_UNAVAILABLE"),
        };

        let head = truncate_at_char_boundary(text, self.snippet_len);
        let snippet = format!("{title}. {head}");

        let doc = match services.embed(&snippet) {
            Ok(v) => v,
            Err(_) => return GateDecision::fail("SERVICE_UNAVAILABLE"),
        };

        let pos = cosine_similarity(&doc, pos_ref);
        let neg = cosine_similarity(&doc, neg_ref);
        let scores = format!("[Pos: {pos:.3} | Neg: {neg:.3}]");

        if neg > pos {
            GateDecision::fail(format!("SEMANTIC_NOISE {scores}"))
        } else if pos < self.threshold {
            GateDecision::fail(format!("LOW_RELEVANCE {scores}"))
        } else {
            GateDecision::pass(format!("SEMANTIC_MATCH {scores}"))
        }
    }
}

fn embed_joined(services: &ScoringServices, phrases: &[String]) -> Option<Vec<f32>> {
    if phrases.is_empty() {
        return None;
    }
    services.embed(&phrases.join(" ")).ok()
}

/// Cut `text` to at most `max_bytes`, backing up to the nearest char
/// boundary so multi-byte sequences are never split.
fn truncate_at_char_boundary(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
