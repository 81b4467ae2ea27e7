//! Reel reader: turns long text into screen-sized, sentence-bounded chunks
//! and keeps a highlighted word in step with narration of a chunk.
//!
//! * [`text`] — normalization, sentence splitting, tokenizing and chunking.
//! * [`playback`] — clocks, pacing and the word-index resolvers.
//! * [`narration`] — timing strategies and their audio collaborators.
//! * [`sync`] — the session controller and its events.
//! * [`library`] — ingested books and their JSON store.
//! * [`config`] — settings and platform paths.

pub mod config;
pub mod library;
pub mod narration;
pub mod playback;
pub mod sync;
pub mod text;
