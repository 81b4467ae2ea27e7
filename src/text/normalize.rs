//! Whitespace normalisation applied before segmentation.
//!
//! Every later stage (sentence splitting, paragraph detection, chunk offsets)
//! assumes its input has been through [`normalize_text`]:
//!
//! * CRLF and lone CR become LF.
//! * Runs of horizontal whitespace collapse to a single space.
//! * Spaces touching a newline are dropped.
//! * Three or more consecutive newlines collapse to exactly two, so a blank
//!   line is the only paragraph separator.
//! * The result is trimmed.
//!
//! Normalisation is idempotent.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_HORIZONTAL_WS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t\u{00A0}\u{000B}\u{000C}]+").expect("valid regex"));
static RE_SPACE_AROUND_NEWLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" ?\n ?").expect("valid regex"));
static RE_EXCESS_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Paragraph separator in normalised text.
pub const PARAGRAPH_BREAK: &str = "\n\n";

/// Normalise raw prose into the canonical form used by the segmenter.
///
/// ```
/// use reel_reader::text::normalize_text;
///
/// let raw = "One.\r\n\r\n\r\n\r\nTwo \t  words.  ";
/// assert_eq!(normalize_text(raw), "One.\n\nTwo words.");
/// ```
pub fn normalize_text(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");
    let collapsed = RE_HORIZONTAL_WS.replace_all(&unified, " ");
    let hugged = RE_SPACE_AROUND_NEWLINE.replace_all(&collapsed, "\n");
    let paragraphs = RE_EXCESS_NEWLINES.replace_all(&hugged, PARAGRAPH_BREAK);
    paragraphs.trim().to_string()
}

/// Split normalised text into paragraphs.
///
/// Single newlines inside a paragraph are soft line breaks and are turned into
/// spaces. Empty paragraphs are skipped.
pub fn paragraphs(normalized: &str) -> Vec<String> {
    normalized
        .split(PARAGRAPH_BREAK)
        .map(|p| p.replace('\n', " ").trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crlf_becomes_lf() {
        assert_eq!(normalize_text("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn collapses_horizontal_whitespace() {
        assert_eq!(normalize_text("a \t\u{00A0}  b"), "a b");
    }

    #[test]
    fn collapses_three_or_more_newlines_to_two() {
        assert_eq!(normalize_text("a\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize_text("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn whitespace_only_lines_count_as_blank() {
        assert_eq!(normalize_text("a\n   \n b"), "a\n\nb");
    }

    #[test]
    fn trims_result() {
        assert_eq!(normalize_text("\n\n  hello  \n"), "hello");
        assert_eq!(normalize_text("   "), "");
    }

    #[test]
    fn normalisation_is_idempotent() {
        let raw = "  First line\r\nsecond\t\tline.\n\n\n\nNext  para. ";
        let once = normalize_text(raw);
        assert_eq!(normalize_text(&once), once);
    }

    #[test]
    fn paragraphs_join_soft_breaks() {
        let text = normalize_text("One\ntwo.\n\nThree.");
        assert_eq!(paragraphs(&text), vec!["One two.", "Three."]);
    }

    #[test]
    fn paragraphs_of_empty_text_is_empty() {
        assert!(paragraphs("").is_empty());
    }
}
