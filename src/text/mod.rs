//! Text segmentation: normalisation, sentences, words and chunks.
//!
//! This module provides:
//! * [`normalize_text`] — canonical whitespace form consumed by every stage.
//! * [`SentenceSplitter`] — abbreviation-aware sentence splitting.
//! * [`tokenize`] / [`display_word`] — the one word-splitting rule.
//! * [`ChunkingPolicy`] — validated word-count targets.
//! * [`ChunkBuilder`] / [`chunk_text`] — sentence-atomic chunking.
//!
//! # Quick start
//!
//! ```rust
//! use reel_reader::text::{chunk_text, reconstruct, ChunkingPolicy};
//!
//! let raw = "First paragraph. It is short.\r\n\r\nSecond paragraph here.";
//! let chunks = chunk_text(raw, &ChunkingPolicy::default());
//!
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(
//!     reconstruct(&chunks),
//!     "First paragraph. It is short. Second paragraph here.",
//! );
//! ```

pub mod chunker;
pub mod normalize;
pub mod policy;
pub mod sentence;
pub mod words;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use chunker::{chunk_text, reconstruct, Chunk, ChunkBuilder};
pub use normalize::{normalize_text, paragraphs};
pub use policy::{ChunkingPolicy, ConfigError};
pub use sentence::{split_sentences, SentenceSplitter, DEFAULT_ABBREVIATIONS};
pub use words::{display_word, tokenize, word_count};
