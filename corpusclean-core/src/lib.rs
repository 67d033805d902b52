// Corpusclean Core Library
//
// Newswire corpus cleaning: boundary detection, noise span removal,
// two-stage relevance gating, and per-folder output aggregation.

pub mod types;
pub mod config;
pub mod scoring;
pub mod rules;
pub mod gates;
pub mod formatter;
pub mod decoder;
pub mod storage;
pub mod processor;

// Re-export main types and functions for easy use
pub use types::*;
pub use config::{CleaningConfig, ConceptConfig};
pub use decoder::{DocumentDecoder, PlainTextDecoder};
pub use gates::RelevanceGatekeeper;
pub use processor::CorpusPipeline;
pub use scoring::{ScoringError, ScoringServices, SentenceEmbedder, TokenClassifier};

// Re-export backends for direct use
#[cfg(feature = "http-backend")]
pub use scoring::{HttpEmbedder, HttpTokenClassifier};
