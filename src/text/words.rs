//! Word tokenisation shared by chunking and narration highlighting.
//!
//! [`tokenize`] is the single word-splitting rule of the crate.  Chunk word
//! lists, boundary-offset mapping and the highlighted word all index into the
//! same token sequence, so they must never diverge.

/// Split `text` into maximal runs of non-whitespace characters.
///
/// ```
/// use reel_reader::text::tokenize;
///
/// assert_eq!(tokenize("  Hello,\tworld!\n"), vec!["Hello,", "world!"]);
/// assert!(tokenize("   ").is_empty());
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Number of tokens [`tokenize`] would return, without allocating.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// The form of a token shown as the highlighted word during narration.
///
/// Leading and trailing punctuation is stripped.  A token made entirely of
/// punctuation (an em-dash on its own, say) is returned unchanged so that the
/// highlighted word is never empty and still corresponds 1:1 to its token.
pub fn display_word(token: &str) -> &str {
    let stripped = token.trim_matches(|c: char| !c.is_alphanumeric());
    if stripped.is_empty() {
        token
    } else {
        stripped
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
