// Final text normalization pass, applied to the cleaned body just before
// it is written out. Unicode compatibility normalization plus whitespace
// and punctuation repair for text that went through OCR or translation.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static SPACE_BEFORE_PUNCT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\w+)\s+([.,;:?!])").expect("punctuation pattern is valid")
});

static REPEATED_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" +").expect("space pattern is valid"));

static EXCESS_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("blank-line pattern is valid"));

/// NFKC-normalize and tidy whitespace. Idempotent: running the formatter
/// on its own output changes nothing.
pub fn format_text(text: &str) -> String {
    let normalized: String = text.nfkc().collect();

    let cleaned: String = normalized
        .chars()
        .filter_map(|c| match c {
            '\u{a0}' | '\u{3000}' => Some(' '),
            '\u{200b}' => None,
            c => Some(c),
        })
        .collect();

    let joined = cleaned
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");

    let repaired = SPACE_BEFORE_PUNCT.replace_all(&joined, "$1$2");
    let single_spaced = REPEATED_SPACES.replace_all(&repaired, " ");
    let collapsed = EXCESS_BLANK_LINES.replace_all(&single_spaced, "\n\n");

    collapsed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_exotic_whitespace() {
        let input = "Hello\u{a0}world\u{3000}again\u{200b}!";
        assert_eq!(format_text(input), "Hello world again!");
    }

    #[test]
    fn repairs_space_before_punctuation() {
        assert_eq!(format_text("He said , wait . Go !"), "He said, wait. Go!");
    }

    #[test]
    fn collapses_runs_of_spaces_and_blank_lines() {
        let input = "one    two\n\n\n\n\nthree";
        assert_eq!(format_text(input), "one two\n\nthree");
    }

    #[test]
    fn trims_each_line_and_the_whole_text() {
        let input = "  \n  leading line  \n   indented   \n  ";
        assert_eq!(format_text(input), "leading line\nindented");
    }

    #[test]
    fn applies_compatibility_normalization() {
        // fullwidth digits fold to ASCII under NFKC
        assert_eq!(format_text("ＡＢＣ　１２３"), "ABC 123");
    }

    #[test]
    fn is_idempotent() {
        let once = format_text("He said , wait .\u{a0}\n\n\n\nNext   para");
        assert_eq!(format_text(&once), once);
    }
}
