//! Abbreviation-aware sentence splitting.
//!
//! # Algorithm
//!
//! ```text
//! "Mr. Smith ran. He was fast."
//!    │ record byte offsets of abbreviation periods: {2}
//!    ▼
//!    │ find runs of [.!?]+ followed by whitespace + uppercase, or end of input,
//!    │ skipping runs whose last byte is a recorded offset
//!    ▼
//! ["Mr. Smith ran.", "He was fast."]
//! ```
//!
//! Input is expected to be normalised (see [`normalize_text`]); sentences are
//! trimmed but otherwise returned verbatim.
//!
//! [`normalize_text`]: crate::text::normalize_text

use once_cell::sync::Lazy;
use regex::Regex;

/// Abbreviations whose trailing period never ends a sentence.
///
/// Matching is case-insensitive and anchored on a word boundary.
pub const DEFAULT_ABBREVIATIONS: &[&str] = &[
    "Mr", "Mrs", "Ms", "Dr", "Prof", "Sr", "Jr", "St", "vs", "etc", "e.g", "i.e",
];

static RE_TERMINAL_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").expect("valid regex"));

static DEFAULT_SPLITTER: Lazy<SentenceSplitter> = Lazy::new(SentenceSplitter::new);

// ---------------------------------------------------------------------------
// SentenceSplitter
// ---------------------------------------------------------------------------

/// Splits normalised text into an ordered list of sentences.
///
/// ```
/// use reel_reader::text::SentenceSplitter;
///
/// let splitter = SentenceSplitter::new();
/// assert_eq!(
///     splitter.split("Dr. Jones arrived. Was it late? Yes!"),
///     vec!["Dr. Jones arrived.", "Was it late?", "Yes!"],
/// );
/// ```
#[derive(Debug, Clone)]
pub struct SentenceSplitter {
    abbreviations: Regex,
}

impl SentenceSplitter {
    /// Splitter protecting [`DEFAULT_ABBREVIATIONS`].
    pub fn new() -> Self {
        Self::with_abbreviations(DEFAULT_ABBREVIATIONS.iter().copied())
    }

    /// Splitter protecting the defaults plus `extra` abbreviations.
    ///
    /// Entries are given without their trailing period (`"Gen"`, `"approx"`).
    /// Blank entries are ignored.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extra: Vec<String> = extra
            .into_iter()
            .map(|s| s.as_ref().trim().trim_end_matches('.').to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self::with_abbreviations(
            DEFAULT_ABBREVIATIONS
                .iter()
                .copied()
                .chain(extra.iter().map(String::as_str)),
        )
    }

    fn with_abbreviations<'a>(abbreviations: impl Iterator<Item = &'a str>) -> Self {
        let mut alternatives: Vec<String> = abbreviations.map(regex::escape).collect();
        // Longest first so "Mrs" is tried before "Mr".
        alternatives.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        alternatives.dedup();

        let pattern = format!(r"(?i)\b({})\.", alternatives.join("|"));
        let abbreviations = Regex::new(&pattern).expect("escaped alternation is a valid regex");
        Self { abbreviations }
    }

    /// Split `text` into sentences.  Empty input yields an empty list.
    pub fn split(&self, text: &str) -> Vec<String> {
        let protected = self.protected_periods(text);
        let mut sentences = Vec::new();
        let mut sentence_start = 0;

        for run in RE_TERMINAL_RUN.find_iter(text) {
            if protected.binary_search(&(run.end() - 1)).is_ok() {
                continue;
            }
            if !closes_sentence(&text[run.end()..]) {
                continue;
            }
            push_sentence(&mut sentences, &text[sentence_start..run.end()]);
            sentence_start = run.end();
        }

        push_sentence(&mut sentences, &text[sentence_start..]);
        sentences
    }

    /// Ascending byte offsets of periods that close an abbreviation.
    fn protected_periods(&self, text: &str) -> Vec<usize> {
        self.abbreviations
            .find_iter(text)
            .map(|m| m.end() - 1)
            .collect()
    }
}

impl Default for SentenceSplitter {
    fn default() -> Self {
        Self::new()
    }
}

/// Split with the default abbreviation set.
pub fn split_sentences(text: &str) -> Vec<String> {
    DEFAULT_SPLITTER.split(text)
}

/// A punctuation run ends a sentence when it is followed by end of input, or
/// by whitespace and then an uppercase letter.
fn closes_sentence(rest: &str) -> bool {
    let after_ws = rest.trim_start();
    if after_ws.is_empty() {
        return true;
    }
    after_ws.len() < rest.len() && after_ws.chars().next().is_some_and(char::is_uppercase)
}

fn push_sentence(sentences: &mut Vec<String>, span: &str) {
    let trimmed = span.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
