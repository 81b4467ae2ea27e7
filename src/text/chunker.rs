//! Sentence-atomic chunk builder.
//!
//! [`ChunkBuilder`] groups sentences into [`Chunk`]s ("reels") sized for one
//! screen of reading.  Sentences are never split.  While walking sentences in
//! order, a chunk is closed under three triggers, checked in this order:
//!
//! 1. **Ceiling** — before appending a sentence to a non-empty chunk, if the
//!    new total would exceed `max_words`, close first and start the next chunk
//!    with that sentence.
//! 2. **Target** — after appending, close once the running count reaches
//!    `target_words`.
//! 3. **Paragraph** — with `preserve_paragraphs`, close at a paragraph
//!    boundary once the running count reaches `min_words`.
//!
//! Whatever is still buffered after the last paragraph becomes a final chunk,
//! however small.
//!
//! # Offsets
//!
//! Chunk offsets are character offsets into the *reconstructed* text: every
//! sentence of the input, in order, joined by a single space (see
//! [`reconstruct`]).  They are not offsets into the raw input.

use serde::{Deserialize, Serialize};

use crate::text::normalize::{normalize_text, paragraphs};
use crate::text::policy::ChunkingPolicy;
use crate::text::sentence::SentenceSplitter;
use crate::text::words::{tokenize, word_count};

// ---------------------------------------------------------------------------
// Chunk
// ---------------------------------------------------------------------------

/// A contiguous, sentence-bounded slice of text.
///
/// `words` is always `tokenize(&text)`; the two are created together and a
/// chunk is never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Sequential id, starting at 0.
    pub id: usize,
    /// Sentences joined by single spaces.
    pub text: String,
    /// Word tokens of `text`.
    pub words: Vec<String>,
    /// Inclusive start offset (characters) in the reconstructed text.
    pub start_position: usize,
    /// Exclusive end offset (characters) in the reconstructed text.
    pub end_position: usize,
}

impl Chunk {
    fn new(id: usize, text: String, start_position: usize) -> Self {
        let words = tokenize(&text);
        let end_position = start_position + text.chars().count();
        Self {
            id,
            text,
            words,
            start_position,
            end_position,
        }
    }

    /// Number of words in the chunk.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }
}

// ---------------------------------------------------------------------------
// ChunkBuilder
// ---------------------------------------------------------------------------

/// Turns prose into an ordered, non-overlapping [`Chunk`] sequence.
///
/// Building is pure: the same `(text, policy)` always produces identical
/// output.
///
/// ```
/// use reel_reader::text::{ChunkBuilder, ChunkingPolicy};
///
/// let policy = ChunkingPolicy::new(4, 6, 2, false).unwrap();
/// let chunks = ChunkBuilder::new(policy).build("Mr. Smith ran. He was fast.");
///
/// assert_eq!(chunks.len(), 1);
/// assert_eq!(chunks[0].text, "Mr. Smith ran. He was fast.");
/// assert_eq!(chunks[0].words.len(), 6);
/// ```
#[derive(Debug, Clone)]
pub struct ChunkBuilder {
    policy: ChunkingPolicy,
    splitter: SentenceSplitter,
}

impl ChunkBuilder {
    /// Builder using the default abbreviation set.
    pub fn new(policy: ChunkingPolicy) -> Self {
        Self::with_splitter(policy, SentenceSplitter::new())
    }

    /// Builder using a custom [`SentenceSplitter`].
    pub fn with_splitter(policy: ChunkingPolicy, splitter: SentenceSplitter) -> Self {
        Self { policy, splitter }
    }

    /// The policy this builder applies.
    pub fn policy(&self) -> &ChunkingPolicy {
        &self.policy
    }

    /// Chunk `text`.  The text is normalised first; empty or whitespace-only
    /// input yields an empty list.
    pub fn build(&self, text: &str) -> Vec<Chunk> {
        let normalized = normalize_text(text);
        let mut acc = Accumulator::default();

        for paragraph in paragraphs(&normalized) {
            for sentence in self.splitter.split(&paragraph) {
                let words = word_count(&sentence);

                if !acc.is_empty() && acc.words + words > self.policy.max_words() {
                    acc.close();
                }

                acc.push(sentence, words);

                if acc.words >= self.policy.target_words() {
                    acc.close();
                }
            }

            if self.policy.preserve_paragraphs()
                && !acc.is_empty()
                && acc.words >= self.policy.min_words()
            {
                acc.close();
            }
        }

        acc.close();
        log::debug!(
            "chunker: {} chunk(s) from {} chars",
            acc.chunks.len(),
            normalized.len()
        );
        acc.chunks
    }
}

/// Chunk `text` with `policy` and the default abbreviation set.
pub fn chunk_text(text: &str, policy: &ChunkingPolicy) -> Vec<Chunk> {
    ChunkBuilder::new(*policy).build(text)
}

/// Rebuild the text chunk offsets refer to.
///
/// For every chunk `c`, `reconstruct(chunks)` sliced by characters
/// `[c.start_position, c.end_position)` equals `c.text`.
pub fn reconstruct(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Accumulator
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Accumulator {
    sentences: Vec<String>,
    words: usize,
    /// Start offset of the next chunk in the reconstructed text.
    offset: usize,
    chunks: Vec<Chunk>,
}

impl Accumulator {
    fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    fn push(&mut self, sentence: String, words: usize) {
        self.sentences.push(sentence);
        self.words += words;
    }

    /// Emit the buffered sentences as a chunk.  No-op when empty.
    fn close(&mut self) {
        if self.sentences.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.sentences).join(" ");
        let chunk = Chunk::new(self.chunks.len(), text, self.offset);
        // One separator space between consecutive chunks.
        self.offset = chunk.end_position + 1;
        self.words = 0;
        self.chunks.push(chunk);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
