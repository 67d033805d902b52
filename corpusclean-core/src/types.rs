use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ===== SPAN TYPES =====
// Spans are half-open [start, end) byte ranges in document coordinates.
// Both detectors (learned + structural) emit spans in ABSOLUTE coordinates
// of the raw document; the merger converts to body-relative before slicing.

/// Why the learned detector deleted a sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoiseReason {
    /// Per-sentence noise ratio exceeded the 0.40 threshold
    NoiseRatio,
    /// Sentence carried a "PHOTO:" / "Source:" marker with ratio above 0.10
    VisualSourceTrigger,
}

impl NoiseReason {
    pub fn label(&self) -> &'static str {
        match self {
            NoiseReason::NoiseRatio => "Ratio > 0.4",
            NoiseReason::VisualSourceTrigger => "Visual/Source Trigger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpanKind {
    Header,
    Footer,
    AiNoise(NoiseReason),
    StructuralNoise,
}

/// A flagged noise region in absolute document coordinates.
/// Invariant: 0 <= start < end <= raw text length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub kind: SpanKind,
    pub score: f32,
    /// The text the span covered, kept for review tooling
    pub text: String,
}

impl Span {
    pub fn new(start: usize, end: usize, kind: SpanKind, score: f32, text: String) -> Self {
        Self {
            start,
            end,
            kind,
            score,
            text,
        }
    }
}

/// Sorted, non-overlapping intervals produced by the merger.
/// Invariant: for consecutive intervals, next.start >= current.end.
pub type MergedSpans = Vec<(usize, usize)>;

// ===== DOCUMENT TYPES =====

/// Metadata lifted from the document header by the boundary detector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub title: String,
    pub date: String,
    pub source: String,
}

/// Folder-scoped policy selecting which keyword-gate branch applies.
/// Derived from the containing folder's name, not per document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TopicMode {
    General,
    Modernization,
    StrictCpc,
}

impl TopicMode {
    /// Map a folder basename to its topic mode.
    /// "modern" covers both modernization and modernisation spellings.
    pub fn from_folder_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("modern") {
            TopicMode::Modernization
        } else if lower.contains("cpc") || lower.contains("ccp") || lower.contains("party") {
            TopicMode::StrictCpc
        } else {
            TopicMode::General
        }
    }
}

/// One gate stage's verdict. The keyword stage can short-circuit
/// before the semantic stage ever runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateDecision {
    pub kept: bool,
    pub reason: String,
}

impl GateDecision {
    pub fn pass(reason: impl Into<String>) -> Self {
        Self {
            kept: true,
            reason: reason.into(),
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            kept: false,
            reason: reason.into(),
        }
    }
}

// ===== FOLDER LOG TYPES =====

/// Structured sidecar entry, keyed uniquely by filename within a folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderRecord {
    pub filename: String,
    pub original_text: String,
    pub cleaned_body: String,
    pub highlights: Vec<Span>,
    pub metadata: DocumentMeta,
    pub processed_at: DateTime<Utc>,
}

/// Tabular summary row. `Checked` is a caller-managed review flag;
/// this pipeline always initializes it to "No".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRow {
    #[serde(rename = "Filename")]
    pub filename: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Checked")]
    pub checked: String,
}

/// Per-run counters returned to the caller for display.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub kept: usize,
    pub rejected_keyword: usize,
    pub rejected_semantic: usize,
    pub skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_mode_from_folder_name() {
        assert_eq!(
            TopicMode::from_folder_name("Modernisation_2023"),
            TopicMode::Modernization
        );
        assert_eq!(TopicMode::from_folder_name("CPC_congress"), TopicMode::StrictCpc);
        assert_eq!(TopicMode::from_folder_name("party-news"), TopicMode::StrictCpc);
        assert_eq!(TopicMode::from_folder_name("asean_trade"), TopicMode::General);
    }

    #[test]
    fn noise_reason_labels_are_stable() {
        // review tooling keys off these strings
        assert_eq!(NoiseReason::NoiseRatio.label(), "Ratio > 0.4");
        assert_eq!(
            NoiseReason::VisualSourceTrigger.label(),
            "Visual/Source Trigger"
        );
    }

    #[test]
    fn strict_cpc_wins_only_without_modern() {
        // "modern" is checked first, matching the folder-name priority
        assert_eq!(
            TopicMode::from_folder_name("cpc_modernization"),
            TopicMode::Modernization
        );
    }
}
