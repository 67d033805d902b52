// NoiseSpanCollector - inline noise detection over the article body
//
// Two independent detectors feed the span merger:
//   Detector A (learned): an external per-token classifier scored per
//   paragraph, aggregated to sentence granularity through a per-char mask.
//   Detector B (structural): a fixed, ordered table of regex matchers for
//   boilerplate blocks the wire services inject into article bodies.
//
// Both emit spans in ABSOLUTE document coordinates. The collector operates
// only on the body window between header_end and footer_start.

use crate::config::CleaningConfig;
use crate::rules::merge;
use crate::scoring::{ScoringServices, TokenLabel};
use crate::types::{NoiseReason, Span, SpanKind};
use regex::Regex;

/// Score attached to structural regex matches - always maximal.
const STRUCTURAL_SCORE: f32 = 1.0;

/// Score attached to learned-detector sentence deletions.
const AI_SCORE: f32 = 0.99;

pub struct NoiseSpanCollector {
    structural_patterns: Vec<(&'static str, Regex)>,
    sentence_boundary: Regex,
}

impl Default for NoiseSpanCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseSpanCollector {
    pub fn new() -> Self {
        // Ordered matcher table. Order is a first-class property: earlier
        // entries are the more specific block matchers, the bio separator
        // and disclaimer rules catch what they miss.
        let table: [(&'static str, &'static str); 7] = [
            (
                "related-stories",
                r"(?im)(More\s+On\s+This\s+Topic|Related\s+Stor(?:y|ies))[^\n]*",
            ),
            (
                "read-more",
                r"(?is)(READ\s+MORE\s+(?:HERE|ABOUT)|Click\s+here\s+to\s+read).*?(\n\n|\z)",
            ),
            (
                "newsletter-signup",
                r"(?im)Sign\s+up\s+for\s+the\s+ST\s+Asian\s+Insider\s+newsletter[^\n]*",
            ),
            (
                "auto-translation-disclaimer",
                r"(?is)Disclaimer:\s+The\s+Above\s+Content\s+is\s+Auto-Translated.*",
            ),
            ("category-tag", r"(?i)\[Category:.*?\]"),
            // A run of 5+ underscores/hyphens starts an author bio; everything
            // after it goes
            ("author-bio-separator", r"(?ms)^\s*[_\-]{5,}.*"),
            (
                "opinion-disclaimer",
                r"(?im)^The\s+views\s+expressed\s+are\s+(personal|solely\s+those\s+of\s+the\s+author)[^\n]*$",
            ),
        ];

        Self {
            structural_patterns: table
                .iter()
                .map(|(name, pat)| (*name, Regex::new(pat).expect("structural pattern is valid")))
                .collect(),
            // A sentence ends after punctuation followed by whitespace;
            // the final sentence runs to paragraph end
            sentence_boundary: Regex::new(r"[.!?]\s+").expect("sentence pattern is valid"),
        }
    }

    /// Scan the body window for noise and excise it.
    /// Returns the reconstructed clean body plus every flagged span
    /// (absolute coordinates, both detectors).
    pub fn collect(
        &self,
        raw_text: &str,
        header_end: usize,
        footer_start: usize,
        config: &CleaningConfig,
        services: &ScoringServices,
    ) -> (String, Vec<Span>) {
        if header_end >= footer_start {
            return (String::new(), Vec::new());
        }

        let window = &raw_text[header_end..footer_start];
        let body = window.trim_start();
        let body_offset = header_end + (window.len() - body.len());

        let mut all_spans: Vec<Span> = Vec::new();

        // Detector A: learned per-token classifier, sentence-smoothed
        if services.has_classifier() {
            all_spans.extend(self.learned_spans(body, body_offset, config, services));
        }

        // Detector B: structural regex table over the whole body
        for (_, pattern) in &self.structural_patterns {
            for m in pattern.find_iter(body) {
                all_spans.push(Span::new(
                    body_offset + m.start(),
                    body_offset + m.end(),
                    SpanKind::StructuralNoise,
                    STRUCTURAL_SCORE,
                    m.as_str().to_string(),
                ));
            }
        }

        let clean_body = merge::merge_and_slice(body, &all_spans, body_offset);
        (clean_body, all_spans)
    }

    fn learned_spans(
        &self,
        body: &str,
        body_offset: usize,
        config: &CleaningConfig,
        services: &ScoringServices,
    ) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut rel_pos = 0;

        for para in body.split_inclusive('\n') {
            let para_start = rel_pos;
            rel_pos += para.len();

            if para.trim().chars().count() < config.min_paragraph_len {
                continue;
            }

            let ranges = match services.score_tokens(para) {
                Ok(ranges) => ranges,
                Err(e) => {
                    // Degrade: the document is treated as having zero
                    // learned-noise spans; the run continues
                    eprintln!("⚠️  Token classifier failed ({e}); skipping learned detection");
                    return Vec::new();
                }
            };

            let mut char_is_noise = vec![false; para.len()];
            for r in ranges {
                if r.label != TokenLabel::Noise {
                    continue;
                }
                let start = r.start.min(para.len());
                let end = r.end.min(para.len());
                // A backend can return garbage ranges; an inverted or empty
                // one must not take the run down
                if start >= end {
                    continue;
                }
                for flag in &mut char_is_noise[start..end] {
                    *flag = true;
                }
            }

            spans.extend(self.sentence_deletions(
                para,
                &char_is_noise,
                body_offset + para_start,
                config,
            ));
        }

        spans
    }

    /// Smooth the per-char mask to sentence granularity and decide deletions.
    fn sentence_deletions(
        &self,
        para: &str,
        char_is_noise: &[bool],
        abs_offset: usize,
        config: &CleaningConfig,
    ) -> Vec<Span> {
        let mut boundaries: Vec<(usize, usize)> = Vec::new();
        let mut start = 0;
        for m in self.sentence_boundary.find_iter(para) {
            boundaries.push((start, m.end()));
            start = m.end();
        }
        boundaries.push((start, para.len()));

        let keywords_lower: Vec<String> = config
            .protected_keywords
            .iter()
            .map(|k| k.to_lowercase())
            .collect();

        let mut deleted = Vec::new();
        for (sent_start, sent_end) in boundaries {
            let sent_text = &para[sent_start..sent_end];
            if sent_text.trim().is_empty() {
                continue;
            }

            let sent_len = sent_end - sent_start;
            let noise_chars = char_is_noise[sent_start..sent_end]
                .iter()
                .filter(|&&flag| flag)
                .count();
            let noise_ratio = noise_chars as f32 / sent_len as f32;

            let sent_lower = sent_text.to_lowercase();
            let protected = keywords_lower.iter().any(|kw| sent_lower.contains(kw));
            if protected {
                continue; // absolute override, always kept
            }

            let reason = if noise_ratio > config.noise_ratio_threshold {
                Some(NoiseReason::NoiseRatio)
            } else if (sent_text.contains("PHOTO:") || sent_text.contains("Source:"))
                && noise_ratio > config.visual_trigger_ratio
            {
                Some(NoiseReason::VisualSourceTrigger)
            } else {
                None
            };

            if let Some(reason) = reason {
                deleted.push(Span::new(
                    abs_offset + sent_start,
                    abs_offset + sent_end,
                    SpanKind::AiNoise(reason),
                    AI_SCORE,
                    sent_text.to_string(),
                ));
            }
        }

        deleted
    }
}
