// Input decoding seam. The pipeline only ever sees a String per
// document; anything able to turn a file into text (plain files today,
// scraped HTML or OCR output later) plugs in behind this trait.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

pub trait DocumentDecoder {
    /// Read one document into text.
    fn decode(&self, path: &Path) -> Result<String>;

    /// Whether this decoder handles the given file at all.
    fn supports(&self, path: &Path) -> bool;

    fn name(&self) -> &str;
}

/// UTF-8 text files. Invalid byte sequences are replaced rather than
/// rejected; scraped corpora routinely carry a few mangled bytes.
pub struct PlainTextDecoder;

impl DocumentDecoder for PlainTextDecoder {
    fn decode(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn supports(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("txt"))
            .unwrap_or(false)
    }

    fn name(&self) -> &str {
        "plain-text"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn supports_txt_extension_case_insensitively() {
        let d = PlainTextDecoder;
        assert!(d.supports(&PathBuf::from("a/b/story.txt")));
        assert!(d.supports(&PathBuf::from("STORY.TXT")));
        assert!(!d.supports(&PathBuf::from("notes.md")));
        assert!(!d.supports(&PathBuf::from("no_extension")));
    }

    #[test]
    fn decodes_invalid_utf8_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        fs::write(&path, [b'o', b'k', 0xff, b'!']).unwrap();
        let text = PlainTextDecoder.decode(&path).unwrap();
        assert_eq!(text, "ok\u{fffd}!");
    }
}
