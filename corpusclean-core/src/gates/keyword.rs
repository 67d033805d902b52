// KeywordGate - stage 1 of the relevance chain (cheap, lexical)
//
// Ordered rule evaluation, priority as a first-class property:
//   1. whitelist phrases        -> PASS (overrides everything)
//   2. local disambiguation     -> FAIL (known unrelated CCP/CPC domains)
//   3. topic-mode branch        -> PASS/FAIL/fall through
//   4. generic anchors          -> PASS/FAIL
//
// The gate only decides whether a document is worth the (much more
// expensive) semantic stage; STRICT_CPC deliberately defers final judgment
// to stage 2 once the bare acronym is present.

use crate::types::{GateDecision, TopicMode};
use regex::Regex;

/// Unambiguous high-confidence phrases - one hit keeps the document,
/// no matter what the disambiguation rules would say.
pub const WHITELIST_PHRASES: [&str; 7] = [
    "Communist Party of China",
    "Chinese Communist Party",
    "General Secretary of the CPC",
    "General Secretary of the CCP",
    "ruling party of China",
    "CCP regime",
    "Beijing's ruling CPC",
];

/// Minimal lexical signals for a document to be considered in-domain.
const CHINA_ANCHORS: [&str; 9] = [
    "china",
    "chinese",
    "beijing",
    "xi jinping",
    "prc",
    "ccp",
    "cpc",
    "south china sea",
    "asean",
];

pub struct KeywordGate {
    modernization_patterns: Vec<Regex>,
    local_noise_patterns: Vec<Regex>,
}

impl Default for KeywordGate {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordGate {
    pub fn new() -> Self {
        let modernization = [
            r"(?i)Chinese(-|\s+)style\s+moderni[sz]ation",
            r"(?i)Chinese\s+path\s+to\s+moderni[sz]ation",
            r"(?i)Chinese\s+moderni[sz]ation",
        ];

        // Homonym resolution: the CCP cultural venue in Manila, the CPC
        // child-protection agencies, and the Criminal Procedure Code all
        // share acronyms with the target topic and must fail fast.
        let local_noise = [
            r"(?i)Cultural\s+Center\s+of\s+the\s+Philippines",
            r"(?i)\bCCP\s+(Complex|Main Theater|Little Theater|Studio|Dance|Ballet|Orchestra|Visual Arts|Children's Biennale)\b",
            r"(?i)\b(at|visit|ticket|show|exhibit|perform)\s+(at\s+)?(the\s+)?CCP\b",
            r"(?i)Child\s+Protection\s+Center",
            r"(?i)Valenzuela\s+City\s+CPC",
            r"(?i)\bCPC\s+(comprising|staffed|team|doctors|social workers|barangay)\b",
            r"(?i)\bSection\s+\d+\s+of\s+(the\s+)?CPC\b",
            r"(?i)\b(charged|investigated|detained|court)\s+under\s+(the\s+)?CPC\b",
            r"(?i)\bCPC\s+(Code|Act|Section|provision)\b",
        ];

        Self {
            modernization_patterns: modernization
                .iter()
                .map(|p| Regex::new(p).expect("modernization pattern is valid"))
                .collect(),
            local_noise_patterns: local_noise
                .iter()
                .map(|p| Regex::new(p).expect("disambiguation pattern is valid"))
                .collect(),
        }
    }

    pub fn evaluate(&self, text: &str, title: &str, mode: TopicMode) -> GateDecision {
        let combined = format!("{title}\n{text}");
        let combined_lower = combined.to_lowercase();

        // 1. Absolute whitelist - highest priority, short-circuits
        for phrase in WHITELIST_PHRASES {
            if combined_lower.contains(&phrase.to_lowercase()) {
                return GateDecision::pass("WHITELIST_MATCH");
            }
        }

        // 2. Local disambiguation - known unrelated acronym domains
        for pat in &self.local_noise_patterns {
            if pat.is_match(&combined) {
                return GateDecision::fail(format!("NOISE_PATTERN: {}", pat.as_str()));
            }
        }

        // 3. Topic-mode branch
        match mode {
            TopicMode::Modernization => {
                for pat in &self.modernization_patterns {
                    if pat.is_match(&combined) {
                        return GateDecision::pass("MODERNIZATION_MATCH");
                    }
                }
                // fall through to the generic anchor check
            }
            TopicMode::StrictCpc => {
                // Whole-word acronym required; "cpcode" must not count
                let has_abbr = combined_lower
                    .split_whitespace()
                    .any(|tok| tok == "ccp" || tok == "cpc");
                if !has_abbr {
                    return GateDecision::fail("NO_CPC_ABBR");
                }
                // Present: hand off to the semantic stage for the final call
                return GateDecision::pass("CPC_ABBR_FOUND");
            }
            TopicMode::General => {}
        }

        // 4. Generic anchor check
        for anchor in CHINA_ANCHORS {
            if combined_lower.contains(anchor) {
                return GateDecision::pass("ANCHOR_MATCH");
            }
        }

        GateDecision::fail("NO_CHINA_KEYWORDS")
    }
}
