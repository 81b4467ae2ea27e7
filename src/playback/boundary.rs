//! Boundary events: character offsets reported by a speech engine.
//!
//! A local speech engine reports progress as "reached character N of the
//! utterance".  [`word_index_at_offset`] maps such an offset back onto the
//! word list produced by [`tokenize`](crate::text::tokenize), assuming words
//! are separated by exactly one character (chunk text always is).

/// Progress report from a speech engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryEvent {
    /// Character offset into the spoken text.
    pub char_index: usize,
}

impl BoundaryEvent {
    pub fn at(char_index: usize) -> Self {
        Self { char_index }
    }
}

/// Word index containing character `offset`.
///
/// Word lengths (in characters) plus one separator each are accumulated until
/// the running count passes `offset`.  Offsets past the end map to the last
/// word; an empty word list maps to `None`.
///
/// ```
/// use reel_reader::playback::word_index_at_offset;
///
/// let words: Vec<String> = ["Hi", "there", "friend"].iter().map(|s| s.to_string()).collect();
/// assert_eq!(word_index_at_offset(&words, 0), Some(0));
/// assert_eq!(word_index_at_offset(&words, 3), Some(1));
/// assert_eq!(word_index_at_offset(&words, 9), Some(2));
/// ```
pub fn word_index_at_offset(words: &[String], offset: usize) -> Option<usize> {
    let mut running = 0usize;
    for (index, word) in words.iter().enumerate() {
        running += word.chars().count() + 1;
        if offset < running {
            return Some(index);
        }
    }
    words.len().checked_sub(1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
