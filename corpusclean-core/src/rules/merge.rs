// SpanMerger - interval algebra over noise spans
//
// Both detectors emit spans in absolute document coordinates, possibly
// overlapping (the learned and structural detectors frequently flag the
// same passage). Before excision the spans are normalized to body-relative
// coordinates, clamped, sorted, and merged so slicing never double-cuts.

use crate::types::{MergedSpans, Span};
use regex::Regex;
use std::sync::LazyLock;

static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("newline pattern is valid"));

/// Normalize absolute spans against a body window: shift to body-relative,
/// clamp both endpoints into `[0, body_len]`, drop anything empty after
/// clamping.
pub fn normalize(spans: &[Span], body_offset: usize, body_len: usize) -> Vec<(usize, usize)> {
    spans
        .iter()
        .map(|s| {
            let start = s.start.saturating_sub(body_offset).min(body_len);
            let end = s.end.saturating_sub(body_offset).min(body_len);
            (start, end)
        })
        .filter(|(start, end)| start < end)
        .collect()
}

/// Merge intervals into a sorted, non-overlapping set. Touching intervals
/// merge too, so `[10,20)` and `[20,25)` become `[10,25)`. The result is
/// invariant to input order and idempotent on already-merged sets.
pub fn merge(mut intervals: Vec<(usize, usize)>) -> MergedSpans {
    intervals.sort_by_key(|&(start, _)| start);

    let mut merged: MergedSpans = Vec::new();
    for (start, end) in intervals {
        match merged.last_mut() {
            Some((_, curr_end)) if start <= *curr_end => {
                *curr_end = (*curr_end).max(end);
            }
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Excise the merged intervals from the body: keep every fragment outside
/// them in original order, then collapse 3+ newlines to 2 and trim.
pub fn slice_out(body: &str, merged: &MergedSpans) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(merged.len() + 1);
    let mut last_pos = 0;
    for &(start, end) in merged {
        parts.push(&body[last_pos..start]);
        last_pos = end;
    }
    parts.push(&body[last_pos..]);

    let joined = parts.concat();
    EXCESS_NEWLINES.replace_all(&joined, "\n\n").trim().to_string()
}

/// Full pipeline: normalize absolute spans against the body window, merge,
/// and reconstruct the excised body text.
pub fn merge_and_slice(body: &str, spans: &[Span], body_offset: usize) -> String {
    let intervals = normalize(spans, body_offset, body.len());
    let merged = merge(intervals);
    slice_out(body, &merged)
}
