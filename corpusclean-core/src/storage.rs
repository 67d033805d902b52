// Folder-level output persistence
//
// Each input folder gets an `output/` directory holding:
//   - one tagged .txt file per kept document
//   - records.json, the full structured record collection
//   - progress_log.csv, a flat review sheet
//
// Both aggregate files are upserted per document: re-processing a file
// replaces its earlier entry instead of appending a duplicate. The whole
// collection is rewritten on every upsert; folders hold hundreds of
// documents, not millions, and a rewrite keeps the file valid even if
// the run dies mid-folder.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::types::{FolderRecord, SummaryRow};

const RECORDS_FILE: &str = "records.json";
const PROGRESS_FILE: &str = "progress_log.csv";

/// Make a name safe for every filesystem we write to. macOS resource
/// fork prefixes are dropped entirely.
pub fn sanitize_filename(name: &str) -> String {
    let name = name.strip_prefix("._").unwrap_or(name);
    name.chars()
        .map(|c| match c {
            '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

pub struct FolderAggregator {
    output_dir: PathBuf,
}

impl FolderAggregator {
    /// Create (or reuse) the output directory for one input folder.
    pub fn new(output_dir: &Path) -> Result<Self> {
        fs::create_dir_all(output_dir)
            .with_context(|| format!("failed to create output dir {}", output_dir.display()))?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write one cleaned document as a tagged text file. Returns the
    /// path actually written (the name may have been sanitized).
    pub fn write_document(&self, filename: &str, record: &FolderRecord) -> Result<PathBuf> {
        let safe = sanitize_filename(filename);
        let path = self.output_dir.join(&safe);
        let meta = &record.metadata;
        let content = format!(
            "<title>{}</title>\n<date>{}</date>\n<source>{}</source>\n<body>\n{}\n</body>",
            meta.title, meta.date, meta.source, record.cleaned_body
        );
        fs::write(&path, content)
            .with_context(|| format!("failed to write document {}", path.display()))?;
        Ok(path)
    }

    /// Upsert one record into records.json, keyed by filename.
    pub fn upsert_record(&self, record: FolderRecord) -> Result<()> {
        let path = self.output_dir.join(RECORDS_FILE);
        let mut records = self.load_records(&path);
        records.retain(|r| r.filename != record.filename);
        records.push(record);

        let json = serde_json::to_string_pretty(&records)?;
        fs::write(&path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    /// Upsert one row into progress_log.csv, keyed by filename.
    pub fn upsert_summary(&self, row: SummaryRow) -> Result<()> {
        let path = self.output_dir.join(PROGRESS_FILE);
        let mut rows = self.load_summary(&path);
        rows.retain(|r| r.filename != row.filename);
        rows.push(row);

        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        for r in &rows {
            writer.serialize(r)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Load the existing record collection. A missing file is an empty
    /// collection; a corrupt one is replaced after a warning rather than
    /// aborting the run.
    fn load_records(&self, path: &Path) -> Vec<FolderRecord> {
        let Ok(raw) = fs::read_to_string(path) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                eprintln!(
                    "⚠️  Corrupt {} ({}), starting a fresh collection",
                    path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    fn load_summary(&self, path: &Path) -> Vec<SummaryRow> {
        let Ok(mut reader) = csv::Reader::from_path(path) else {
            return Vec::new();
        };
        let mut rows = Vec::new();
        for row in reader.deserialize::<SummaryRow>() {
            match row {
                Ok(r) => rows.push(r),
                Err(e) => {
                    eprintln!("⚠️  Skipping corrupt row in {}: {}", path.display(), e);
                }
            }
        }
        rows
    }
}
