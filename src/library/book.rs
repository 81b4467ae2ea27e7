//! Ingested books.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::text::{Chunk, ChunkBuilder, ChunkingPolicy};

/// Disambiguates books ingested within the same second.
static BOOK_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate a unique book id of the form `book-<unix secs>-<n>`.
pub fn next_book_id(created_at: u64) -> String {
    let n = BOOK_ID_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("book-{created_at}-{n}")
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// BookRecord
// ---------------------------------------------------------------------------

/// A chunked text plus the reader's place in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: String,
    pub title: String,
    /// Unix seconds.
    pub created_at: u64,
    pub chunks: Vec<Chunk>,
    /// Index of the chunk being read.
    #[serde(default)]
    pub position: usize,
    /// Policy the chunks were built with.
    pub policy: ChunkingPolicy,
}

impl BookRecord {
    /// Chunk `raw` with `policy` into a new record positioned at chunk 0.
    pub fn ingest(title: impl Into<String>, raw: &str, policy: ChunkingPolicy) -> Self {
        Self::ingest_with(title, raw, &ChunkBuilder::new(policy))
    }

    /// Like [`ingest`](Self::ingest) with a preconfigured builder (e.g. extra
    /// abbreviations).
    pub fn ingest_with(title: impl Into<String>, raw: &str, builder: &ChunkBuilder) -> Self {
        let created_at = unix_now();
        let chunks = builder.build(raw);
        let record = Self {
            id: next_book_id(created_at),
            title: title.into(),
            created_at,
            chunks,
            position: 0,
            policy: *builder.policy(),
        };
        log::info!(
            "library: ingested \"{}\" as {} ({} chunk(s), {} word(s))",
            record.title,
            record.id,
            record.chunks.len(),
            record.word_count()
        );
        record
    }

    pub fn word_count(&self) -> usize {
        self.chunks.iter().map(Chunk::word_count).sum()
    }

    /// The chunk at `position`, `None` for an empty book.
    pub fn current_chunk(&self) -> Option<&Chunk> {
        self.chunks.get(self.position)
    }

    /// Move to chunk `index`, clamped to the last chunk.  Returns the new
    /// position.
    pub fn set_position(&mut self, index: usize) -> usize {
        self.position = index.min(self.chunks.len().saturating_sub(1));
        self.position
    }

    /// Step to the next chunk.  Returns `false` at the last one.
    pub fn advance(&mut self) -> bool {
        if self.position + 1 < self.chunks.len() {
            self.position += 1;
            true
        } else {
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{reconstruct, SentenceSplitter};

    fn policy() -> ChunkingPolicy {
        ChunkingPolicy::new(4, 6, 2, true).unwrap()
    }

    const TEXT: &str = "One two three four. Five six. Seven eight nine.\n\nTen eleven.";

    #[test]
    fn ingest_chunks_text() {
        let book = BookRecord::ingest("Numbers", TEXT, policy());
        assert_eq!(book.title, "Numbers");
        assert_eq!(book.position, 0);
        assert_eq!(book.policy, policy());
        assert_eq!(book.word_count(), 11);
        assert_eq!(
            reconstruct(&book.chunks),
            "One two three four. Five six. Seven eight nine. Ten eleven."
        );
        assert_eq!(book.current_chunk().map(|c| c.id), Some(0));
    }

    #[test]
    fn ids_are_unique() {
        let a = BookRecord::ingest("a", "x.", policy());
        let b = BookRecord::ingest("b", "y.", policy());
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("book-"));
    }

    #[test]
    fn ingest_with_custom_splitter() {
        // One sentence per chunk.
        let tiny = ChunkingPolicy::new(1, 1, 1, true).unwrap();
        let builder = ChunkBuilder::with_splitter(tiny, SentenceSplitter::with_extra(["Capt"]));
        let book = BookRecord::ingest_with("Sea", "Capt. Nemo dived. Deep.", &builder);
        assert_eq!(book.chunks.len(), 2);
        assert_eq!(book.chunks[0].text, "Capt. Nemo dived.");
        assert_eq!(book.policy, tiny);
    }

    #[test]
    fn position_is_clamped() {
        let mut book = BookRecord::ingest("Numbers", TEXT, policy());
        let last = book.chunks.len() - 1;
        assert_eq!(book.set_position(99), last);
        assert!(!book.advance());
        assert_eq!(book.set_position(0), 0);
        assert!(book.advance());
        assert_eq!(book.position, 1);
    }

    #[test]
    fn empty_book_has_no_current_chunk() {
        let mut book = BookRecord::ingest("Empty", "  \n ", policy());
        assert!(book.chunks.is_empty());
        assert!(book.current_chunk().is_none());
        assert_eq!(book.set_position(3), 0);
        assert!(!book.advance());
    }

    #[test]
    fn record_round_trips_through_json() {
        let book = BookRecord::ingest("Numbers", TEXT, policy());
        let json = serde_json::to_string(&book).unwrap();
        let back: BookRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, book);
    }
}
