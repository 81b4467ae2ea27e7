//! Playback timing: from "where is the audio" to "which word is active".
//!
//! * [`PlaybackClock`] — pausable wall clock for narrations without audio
//!   ground truth.
//! * [`WordPacer`] / [`word_interval`] — fixed-interval pacing.
//! * [`word_index_at_offset`] / [`BoundaryEvent`] — speech-engine offsets.
//! * [`AlignmentTable`] / [`WordTiming`] / [`timing_index_at`] — precomputed
//!   provider alignment.
//! * [`WordIndexResolver`] — one resolver per narration, over all sources.
//! * [`MonotonicIndex`] — never-backwards, emit-once guard.

pub mod alignment;
pub mod boundary;
pub mod clock;
pub mod pacer;
pub mod resolver;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use alignment::{seconds_to_ms, timing_index_at, AlignmentError, AlignmentTable, WordTiming};
pub use boundary::{word_index_at_offset, BoundaryEvent};
pub use clock::PlaybackClock;
pub use pacer::{word_interval, WordPacer, DEFAULT_WORDS_PER_MINUTE};
pub use resolver::{
    AlignedTimings, BoundaryTracker, DurationPacing, MonotonicIndex, WordIndexResolver,
};
