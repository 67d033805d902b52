// Pipeline orchestration
//
// Walks input folders, runs each document through the relevance gates and
// the cleaning rules, and persists kept documents through the folder
// aggregator. Every per-document failure degrades that document only;
// the run itself never aborts over one bad file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use chrono::Utc;
use walkdir::WalkDir;

use crate::config::{CleaningConfig, ConceptConfig};
use crate::decoder::{DocumentDecoder, PlainTextDecoder};
use crate::formatter;
use crate::gates::RelevanceGatekeeper;
use crate::rules::{BoundaryDetector, NoiseSpanCollector};
use crate::scoring::ScoringServices;
use crate::storage::FolderAggregator;
use crate::types::{FolderRecord, RunSummary, Span, SpanKind, SummaryRow, TopicMode};

const OUTPUT_DIR_NAME: &str = "output";

/// Progress reporting hook: (documents handled so far, total, status line).
pub type ProgressFn<'a> = &'a mut dyn FnMut(usize, usize, &str);

enum DocOutcome {
    Kept,
    RejectedKeyword,
    RejectedSemantic,
    Skipped,
}

pub struct CorpusPipeline {
    services: ScoringServices,
    gatekeeper: RelevanceGatekeeper,
    boundary: BoundaryDetector,
    collector: NoiseSpanCollector,
    config: CleaningConfig,
    decoder: Box<dyn DocumentDecoder>,
}

impl CorpusPipeline {
    pub fn new(
        services: ScoringServices,
        concepts: ConceptConfig,
        config: CleaningConfig,
    ) -> Self {
        let gatekeeper = RelevanceGatekeeper::new(concepts, &config, &services);
        Self {
            services,
            gatekeeper,
            boundary: BoundaryDetector::new(),
            collector: NoiseSpanCollector::new(),
            config,
            decoder: Box::new(PlainTextDecoder),
        }
    }

    pub fn with_decoder(mut self, decoder: Box<dyn DocumentDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Tear down the scoring services. Safe to call more than once.
    pub fn release(&mut self) {
        self.services.release();
    }

    /// Process every supported document under `input_dir`, one folder at
    /// a time. Returns the run counters for the caller to display.
    pub fn process_folder(
        &self,
        input_dir: &Path,
        recursive: bool,
        mut progress: Option<ProgressFn<'_>>,
    ) -> Result<RunSummary> {
        if !input_dir.is_dir() {
            bail!("input directory not found: {}", input_dir.display());
        }

        let mut by_folder = self.collect_inputs(input_dir, recursive);
        // Recursive runs treat the scan root as a container of folders, not
        // a folder of its own: loose files there get no output/ sibling
        if recursive && by_folder.remove(input_dir).is_some() {
            println!(
                "⏭️  Skipping loose files in the scan root {}",
                input_dir.display()
            );
        }
        let total: usize = by_folder.values().map(Vec::len).sum();
        let mut summary = RunSummary::default();
        let mut handled = 0usize;

        for (folder, files) in &by_folder {
            let mode = topic_mode_for(folder);
            println!(
                "📂 Processing folder {} ({} files, mode {:?})",
                folder.display(),
                files.len(),
                mode
            );
            // A folder whose output dir cannot be created degrades that
            // folder only; the run moves on
            let aggregator = match FolderAggregator::new(&folder.join(OUTPUT_DIR_NAME)) {
                Ok(agg) => agg,
                Err(e) => {
                    eprintln!(
                        "⚠️  Cannot prepare output for {}: {:#}; skipping folder",
                        folder.display(),
                        e
                    );
                    handled += files.len();
                    summary.total += files.len();
                    summary.skipped += files.len();
                    continue;
                }
            };

            for path in files {
                handled += 1;
                summary.total += 1;
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("unnamed.txt")
                    .to_string();

                match self.process_document(path, &name, mode, &aggregator) {
                    Ok(DocOutcome::Kept) => summary.kept += 1,
                    Ok(DocOutcome::RejectedKeyword) => summary.rejected_keyword += 1,
                    Ok(DocOutcome::RejectedSemantic) => summary.rejected_semantic += 1,
                    Ok(DocOutcome::Skipped) => summary.skipped += 1,
                    Err(e) => {
                        eprintln!("⚠️  Failed on {}: {:#}", path.display(), e);
                        summary.skipped += 1;
                    }
                }

                if let Some(cb) = progress.as_mut() {
                    cb(handled, total, &format!("Processing: {name}"));
                }
            }
        }

        Ok(summary)
    }

    fn process_document(
        &self,
        path: &Path,
        name: &str,
        mode: TopicMode,
        aggregator: &FolderAggregator,
    ) -> Result<DocOutcome> {
        let raw = match self.decoder.decode(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("⚠️  Could not decode {}: {:#}", path.display(), e);
                return Ok(DocOutcome::Skipped);
            }
        };

        let title = raw.lines().next().unwrap_or("").trim();
        let decision = self.gatekeeper.evaluate(&self.services, &raw, title, mode);
        if !decision.kept {
            println!("🚫 Rejected {name}: {}", decision.reason);
            return Ok(classify_rejection(&decision.reason));
        }

        if self.boundary.is_briefing(&raw) {
            println!("⏭️  Skipping briefing digest {name}");
            return Ok(DocOutcome::Skipped);
        }

        let (header_end, footer_start, meta) = self.boundary.analyze(&raw);
        let (clean_body, noise_spans) =
            self.collector
                .collect(&raw, header_end, footer_start, &self.config, &self.services);
        for span in &noise_spans {
            if let SpanKind::AiNoise(reason) = &span.kind {
                println!("   ✂️  Dropped sentence ({})", reason.label());
            }
        }
        let cleaned = formatter::format_text(&clean_body);

        let mut highlights = Vec::new();
        if header_end > 0 {
            highlights.push(Span::new(
                0,
                header_end,
                SpanKind::Header,
                1.0,
                raw[..header_end].to_string(),
            ));
        }
        highlights.extend(noise_spans);
        if footer_start < raw.len() {
            highlights.push(Span::new(
                footer_start,
                raw.len(),
                SpanKind::Footer,
                1.0,
                raw[footer_start..].to_string(),
            ));
        }

        let record = FolderRecord {
            filename: name.to_string(),
            original_text: raw,
            cleaned_body: cleaned,
            highlights,
            metadata: meta.clone(),
            processed_at: Utc::now(),
        };

        aggregator.write_document(name, &record)?;
        aggregator.upsert_summary(SummaryRow {
            filename: name.to_string(),
            title: meta.title,
            date: meta.date,
            source: meta.source,
            checked: "No".to_string(),
        })?;
        aggregator.upsert_record(record)?;

        println!("✅ Kept {name}");
        Ok(DocOutcome::Kept)
    }

    /// Gather supported files, grouped by containing folder. Output
    /// directories from earlier runs are never treated as input.
    fn collect_inputs(&self, input_dir: &Path, recursive: bool) -> BTreeMap<PathBuf, Vec<PathBuf>> {
        let mut by_folder: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
        let walker = if recursive {
            WalkDir::new(input_dir)
        } else {
            WalkDir::new(input_dir).max_depth(1)
        };

        for entry in walker
            .into_iter()
            .filter_entry(|e| e.file_name() != OUTPUT_DIR_NAME)
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file() || !self.decoder.supports(path) {
                continue;
            }
            let folder = path
                .parent()
                .unwrap_or(input_dir)
                .to_path_buf();
            by_folder.entry(folder).or_default().push(path.to_path_buf());
        }

        for files in by_folder.values_mut() {
            files.sort();
        }
        by_folder
    }
}

fn topic_mode_for(folder: &Path) -> TopicMode {
    folder
        .file_name()
        .and_then(|n| n.to_str())
        .map(TopicMode::from_folder_name)
        .unwrap_or(TopicMode::General)
}

fn classify_rejection(reason: &str) -> DocOutcome {
    let keyword_stage = reason == "NO_CHINA_KEYWORDS"
        || reason == "NO_CPC_ABBR"
        || reason.starts_with("NOISE_PATTERN");
    if keyword_stage {
        DocOutcome::RejectedKeyword
    } else {
        DocOutcome::RejectedSemantic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn pipeline() -> CorpusPipeline {
        CorpusPipeline::new(
            ScoringServices::degraded(),
            ConceptConfig::default(),
            CleaningConfig::default(),
        )
    }

    #[test]
    fn collects_only_direct_children_without_recursion() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/b.txt"), "x").unwrap();

        let grouped = pipeline().collect_inputs(dir.path(), false);
        let all: Vec<_> = grouped.values().flatten().collect();
        assert_eq!(all.len(), 1);
        assert!(all[0].ends_with("a.txt"));
    }

    #[test]
    fn recursive_collection_groups_by_folder_and_skips_output_dirs() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("cpc_news/output")).unwrap();
        fs::write(dir.path().join("cpc_news/a.txt"), "x").unwrap();
        fs::write(dir.path().join("cpc_news/output/a.txt"), "stale").unwrap();
        fs::create_dir(dir.path().join("general")).unwrap();
        fs::write(dir.path().join("general/b.txt"), "x").unwrap();
        fs::write(dir.path().join("general/notes.md"), "x").unwrap();

        let grouped = pipeline().collect_inputs(dir.path(), true);
        assert_eq!(grouped.len(), 2);
        let all: Vec<_> = grouped.values().flatten().collect();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|p| !p.to_string_lossy().contains("output")));
    }

    #[test]
    fn rejection_reasons_map_to_the_right_stage() {
        assert!(matches!(
            classify_rejection("NO_CHINA_KEYWORDS"),
            DocOutcome::RejectedKeyword
        ));
        assert!(matches!(
            classify_rejection("NOISE_PATTERN: (?i)Cultural..."),
            DocOutcome::RejectedKeyword
        ));
        assert!(matches!(
            classify_rejection("LOW_RELEVANCE [Pos: 0.050 | Neg: 0.010]"),
            DocOutcome::RejectedSemantic
        ));
        assert!(matches!(
            classify_rejection("SERVICE_UNAVAILABLE"),
            DocOutcome::RejectedSemantic
        ));
    }

    #[test]
    fn missing_input_directory_is_an_error() {
        let result = pipeline().process_folder(Path::new("/nonexistent/corpus"), false, None);
        assert!(result.is_err());
    }
}
