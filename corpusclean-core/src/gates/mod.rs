// Relevance gatekeeping
//
// Two stages, cheap first: a lexical keyword gate prunes the bulk of the
// input before the embedding-based semantic gate runs. A document reaches
// stage 2 only by passing stage 1.

pub mod keyword;
pub mod semantic;

pub use keyword::KeywordGate;
pub use semantic::SemanticGate;

use crate::config::{CleaningConfig, ConceptConfig};
use crate::scoring::ScoringServices;
use crate::types::{GateDecision, TopicMode};

pub struct RelevanceGatekeeper {
    keyword: KeywordGate,
    semantic: SemanticGate,
}

impl RelevanceGatekeeper {
    pub fn new(concepts: ConceptConfig, config: &CleaningConfig, services: &ScoringServices) -> Self {
        Self {
            keyword: KeywordGate::new(),
            semantic: SemanticGate::new(
                concepts,
                config.semantic_threshold,
                config.snippet_len,
                services,
            ),
        }
    }

    pub fn semantic_mut(&mut self) -> &mut SemanticGate {
        &mut self.semantic
    }

    /// Full chain. The stage that rejected is identifiable from the
    /// reason string; callers keying summary counters rely on that.
    pub fn evaluate(
        &self,
        services: &ScoringServices,
        text: &str,
        title: &str,
        mode: TopicMode,
    ) -> GateDecision {
        let first = self.keyword.evaluate(text, title, mode);
        if !first.kept {
            return first;
        }
        self.semantic.evaluate(services, text, title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{ScoringError, SentenceEmbedder};

    struct ConstantEmbedder(Vec<f32>);

    impl SentenceEmbedder for ConstantEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, ScoringError> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "constant"
        }
    }

    #[test]
    fn keyword_rejection_short_circuits_semantic_stage() {
        // embedder would reject everything (zero vector), but the
        // keyword stage fails first and its reason surfaces
        let services =
            ScoringServices::new(None, Some(Box::new(ConstantEmbedder(vec![0.0, 0.0]))));
        let gatekeeper = RelevanceGatekeeper::new(
            ConceptConfig::default(),
            &CleaningConfig::default(),
            &services,
        );

        let decision = gatekeeper.evaluate(
            &services,
            "Town hall debates pothole repairs.",
            "Local roads",
            TopicMode::General,
        );
        assert!(!decision.kept);
        assert_eq!(decision.reason, "NO_CHINA_KEYWORDS");
    }

    /// Centroids land on the x axis; documents land at 45 degrees, so
    /// pos == neg == ~0.707 and the threshold alone decides.
    struct AngledEmbedder;

    impl SentenceEmbedder for AngledEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, ScoringError> {
            if text.contains("Diplomacy") || text.contains("Commercial banking") {
                Ok(vec![1.0, 0.0])
            } else {
                Ok(vec![1.0, 1.0])
            }
        }

        fn name(&self) -> &str {
            "angled"
        }
    }

    #[test]
    fn raising_the_threshold_flips_a_kept_document() {
        let services = ScoringServices::new(None, Some(Box::new(AngledEmbedder)));
        let mut gatekeeper = RelevanceGatekeeper::new(
            ConceptConfig::default(),
            &CleaningConfig::default(),
            &services,
        );

        let text = "Officials in beijing signed the accord.";
        let decision = gatekeeper.evaluate(&services, text, "Trade accord", TopicMode::General);
        assert!(decision.kept);

        gatekeeper.semantic_mut().set_threshold(0.9);
        let decision = gatekeeper.evaluate(&services, text, "Trade accord", TopicMode::General);
        assert!(!decision.kept);
        assert!(decision.reason.starts_with("LOW_RELEVANCE"));
    }

    #[test]
    fn keyword_pass_hands_off_to_semantic_stage() {
        // every embed returns the same vector, so pos == neg == 1.0 and
        // the semantic stage passes
        let services =
            ScoringServices::new(None, Some(Box::new(ConstantEmbedder(vec![1.0, 2.0]))));
        let gatekeeper = RelevanceGatekeeper::new(
            ConceptConfig::default(),
            &CleaningConfig::default(),
            &services,
        );

        let decision = gatekeeper.evaluate(
            &services,
            "Officials in beijing signed the accord.",
            "Trade accord",
            TopicMode::General,
        );
        assert!(decision.kept);
        assert!(decision.reason.starts_with("SEMANTIC_MATCH"));
    }
}
